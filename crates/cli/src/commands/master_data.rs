//! Per-kWh rate and admin fee. Lives under the settings view.

use asrama_token_admin::Route;
use asrama_token_admin::forms::MasterDataForm;
use asrama_token_core::MasterData;

use super::{CliError, Console};

fn print_master_data(data: &MasterData) {
    println!("Rate:      {} / kWh", data.harga_per_kwh);
    println!("Admin fee: {}%", data.biaya_admin_persen.normalize());
}

pub async fn show(console: &Console) -> Result<(), CliError> {
    console.enter(Route::Settings)?;
    match console.client.current_master_data().await? {
        Some(data) => print_master_data(&data),
        None => println!("No master data saved yet"),
    }
    Ok(())
}

pub async fn set(
    console: &Console,
    harga_per_kwh: String,
    biaya_admin_persen: String,
) -> Result<(), CliError> {
    console.enter(Route::Settings)?;
    let mut form = MasterDataForm::new(console.client.current_master_data().await?);
    form.harga_per_kwh = harga_per_kwh;
    form.biaya_admin_persen = biaya_admin_persen;

    let saved = form.save(&console.client).await?;
    print_master_data(&saved);
    Ok(())
}

pub async fn delete(console: &Console) -> Result<(), CliError> {
    console.enter(Route::Settings)?;
    let mut form = MasterDataForm::new(console.client.current_master_data().await?);
    form.delete(&console.client).await?;
    println!("Master data deleted");
    Ok(())
}
