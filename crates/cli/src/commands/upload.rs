use std::path::Path;

use asrama_token_admin::Route;

use super::{CliError, Console};

/// Upload an image and print where it can be fetched.
pub async fn upload(console: &Console, file: &Path) -> Result<(), CliError> {
    console.enter(Route::Admins)?;
    let uploaded = console.client.upload_image_file(file).await?;
    println!("{}", console.client.asset_url(&uploaded.url));
    println!("Stored path: {}", uploaded.url);
    Ok(())
}
