//! Token denominations.

use asrama_token_admin::Route;
use asrama_token_admin::forms::TokenPriceForm;
use asrama_token_core::{TokenPrice, TokenPriceId};

use super::{CliError, Console, print_table};

fn row(price: &TokenPrice) -> [String; 5] {
    [
        price.id.to_string(),
        price.amount.to_string(),
        price.kwh.to_string(),
        price
            .amount
            .per_kwh(price.kwh)
            .map_or_else(|| "-".to_string(), |rate| rate.to_string()),
        if price.is_active { "active" } else { "inactive" }.to_string(),
    ]
}

const HEADER: [&str; 5] = ["ID", "Amount", "Energy", "Per kWh", "Status"];

pub async fn list(console: &Console) -> Result<(), CliError> {
    console.enter(Route::Tokens)?;
    let prices = console.client.list_token_prices().await?;
    let rows: Vec<_> = prices.iter().map(row).collect();
    print_table(HEADER, &rows);
    Ok(())
}

pub async fn create(console: &Console, amount: String, kwh: String) -> Result<(), CliError> {
    console.enter(Route::Tokens)?;
    let mut form = TokenPriceForm::create();
    form.amount = amount;
    form.kwh = kwh;
    let price = form.submit(&console.client).await?;
    print_table(HEADER, &[row(&price)]);
    Ok(())
}

pub async fn update(
    console: &Console,
    id: &TokenPriceId,
    amount: Option<String>,
    kwh: Option<String>,
) -> Result<(), CliError> {
    console.enter(Route::Tokens)?;
    let prices = console.client.list_token_prices().await?;
    let existing = prices
        .iter()
        .find(|price| &price.id == id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    let mut form = TokenPriceForm::edit(existing);
    if let Some(amount) = amount {
        form.amount = amount;
    }
    if let Some(kwh) = kwh {
        form.kwh = kwh;
    }
    let price = form.submit(&console.client).await?;
    print_table(HEADER, &[row(&price)]);
    Ok(())
}

pub async fn delete(console: &Console, id: &TokenPriceId) -> Result<(), CliError> {
    console.enter(Route::Tokens)?;
    console.client.delete_token_price(id).await?;
    println!("Deleted token price {id}");
    Ok(())
}

pub async fn toggle(console: &Console, id: &TokenPriceId) -> Result<(), CliError> {
    console.enter(Route::Tokens)?;
    let price = console.client.toggle_token_price(id).await?;
    print_table(HEADER, &[row(&price)]);
    Ok(())
}
