//! Read-only views: dashboard, residents and purchases.

use asrama_token_admin::Route;
use asrama_token_admin::filters::{StatusFilter, search_purchases, search_users};
use asrama_token_core::SeriesPoint;

use super::{CliError, Console, print_table};

pub async fn dashboard(console: &Console) -> Result<(), CliError> {
    console.enter(Route::Dashboard)?;
    let stats = console.client.dashboard_stats().await?;

    println!("Residents:  {}", stats.total_users);
    println!("Purchases:  {}", stats.total_purchases);
    println!("Revenue:    {}", stats.total_revenue);
    println!("Energy:     {}", stats.total_kwh);

    print_series("Monthly", &stats.monthly_data);
    print_series("Daily", &stats.daily_data);
    Ok(())
}

fn print_series(title: &str, series: &[SeriesPoint]) {
    if series.is_empty() {
        return;
    }
    println!();
    let rows: Vec<[String; 3]> = series
        .iter()
        .map(|point| {
            [
                point.label.clone(),
                point.purchases.to_string(),
                point.revenue.to_string(),
            ]
        })
        .collect();
    print_table([title, "Purchases", "Revenue"], &rows);
}

pub async fn users(console: &Console, search: &str) -> Result<(), CliError> {
    console.enter(Route::Users)?;
    let users = console.client.list_users().await?;

    let rows: Vec<[String; 7]> = search_users(&users, search)
        .into_iter()
        .map(|user| {
            [
                user.nim.clone(),
                user.name.clone(),
                user.email.clone(),
                format!("{} {}", user.asrama, user.room),
                user.balance.to_string(),
                user.total_purchases.to_string(),
                user.status.to_string(),
            ]
        })
        .collect();
    print_table(
        ["NIM", "Name", "Email", "Room", "Balance", "Purchases", "Status"],
        &rows,
    );
    Ok(())
}

pub async fn purchases(
    console: &Console,
    search: &str,
    status: StatusFilter,
) -> Result<(), CliError> {
    console.enter(Route::Purchases)?;
    let purchases = console.client.list_purchases().await?;

    let rows: Vec<[String; 6]> = search_purchases(&purchases, search, status)
        .into_iter()
        .map(|purchase| {
            [
                purchase.date.format("%Y-%m-%d %H:%M").to_string(),
                purchase.user_name.clone(),
                purchase.amount.to_string(),
                purchase.kwh.to_string(),
                purchase.token_code.clone(),
                purchase.status.to_string(),
            ]
        })
        .collect();
    print_table(["Date", "Resident", "Amount", "Energy", "Token", "Status"], &rows);
    Ok(())
}
