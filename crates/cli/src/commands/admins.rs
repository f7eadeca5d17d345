//! Staff account management. Changes are offered to admins only; the
//! backend enforces the same rule.

use std::path::PathBuf;

use secrecy::SecretString;

use asrama_token_admin::Route;
use asrama_token_admin::forms::AdminForm;
use asrama_token_core::{Admin, AdminId, Role};

use super::{CliError, Console, print_table};

/// Field values from the command line. `None` keeps the current value.
pub struct AdminChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub avatar: Option<PathBuf>,
}

impl AdminChanges {
    fn apply(self, form: &mut AdminForm) {
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(email) = self.email {
            form.email = email;
        }
        if let Some(role) = self.role {
            form.role = role;
        }
        if let Some(password) = self.password {
            form.password = SecretString::from(password);
        }
        form.avatar_file = self.avatar;
    }
}

fn print_admin(console: &Console, admin: &Admin) {
    println!("{} <{}> #{}", admin.name, admin.email, admin.id);
    println!("Role:   {}", admin.role);
    println!("Status: {}", admin.status);
    if let Some(avatar) = &admin.avatar {
        println!("Avatar: {}", console.client.asset_url(avatar));
    }
}

pub async fn list(console: &Console) -> Result<(), CliError> {
    console.enter(Route::Admins)?;
    let admins = console.client.list_admins().await?;

    let rows: Vec<[String; 6]> = admins
        .iter()
        .map(|admin| {
            [
                admin.id.to_string(),
                admin.name.clone(),
                admin.email.clone(),
                admin.role.to_string(),
                admin.status.to_string(),
                admin
                    .last_login
                    .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
            ]
        })
        .collect();
    print_table(["ID", "Name", "Email", "Role", "Status", "Last login"], &rows);
    if !console.client.session().can_manage_staff() {
        println!("Read-only: only admins can change staff accounts.");
    }
    Ok(())
}

pub async fn create(console: &Console, changes: AdminChanges) -> Result<(), CliError> {
    console.enter_staff_management()?;
    let mut form = AdminForm::create();
    changes.apply(&mut form);

    let admin = form.submit(&console.client).await?;
    println!("Created:");
    print_admin(console, &admin);
    Ok(())
}

pub async fn update(console: &Console, id: AdminId, changes: AdminChanges) -> Result<(), CliError> {
    console.enter_staff_management()?;
    let admins = console.client.list_admins().await?;
    let existing = admins
        .iter()
        .find(|admin| admin.id == id)
        .ok_or_else(|| CliError::NotFound(id.to_string()))?;

    let mut form = AdminForm::edit(existing);
    changes.apply(&mut form);

    let admin = form.submit(&console.client).await?;
    println!("Updated:");
    print_admin(console, &admin);
    Ok(())
}

pub async fn delete(console: &Console, id: AdminId) -> Result<(), CliError> {
    console.enter_staff_management()?;
    console.client.delete_admin(id).await?;
    println!("Deleted admin #{id}");
    Ok(())
}

pub async fn toggle(console: &Console, id: AdminId) -> Result<(), CliError> {
    console.enter_staff_management()?;
    let admin = console.client.toggle_admin_status(id).await?;
    println!("{} is now {}", admin.name, admin.status);
    Ok(())
}
