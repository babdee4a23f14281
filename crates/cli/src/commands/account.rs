//! Account commands.

use secrecy::SecretString;

use marketplace_storefront::forms::{LoginForm, RegisterForm};
use marketplace_storefront::{Result, Storefront};

/// Raw registration arguments.
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub location: String,
}

/// Sign in.
#[allow(clippy::print_stdout)]
pub async fn login(session: &mut Storefront, email: String, password: String) -> Result<()> {
    let form = LoginForm {
        email,
        password: SecretString::from(password),
    };
    let account = session.login(form).await?;
    println!("Welcome back, {}", account.name);
    Ok(())
}

/// Create an account.
#[allow(clippy::print_stdout)]
pub async fn register(session: &mut Storefront, args: Registration) -> Result<()> {
    let form = RegisterForm {
        name: args.name,
        email: args.email,
        password: SecretString::from(args.password),
        confirm_password: SecretString::from(args.confirm_password),
        location: args.location,
    };
    let email = session.register(form).await?;
    println!("Account created for {email}. You can now log in.");
    Ok(())
}

/// Sign out.
#[allow(clippy::print_stdout)]
pub async fn logout(session: &mut Storefront) -> Result<()> {
    session.logout().await?;
    println!("Signed out");
    Ok(())
}

/// Show the signed-in account.
#[allow(clippy::print_stdout)]
pub fn show(session: &Storefront) {
    match session.account() {
        Some(account) => {
            println!("{}", account.name);
            println!("{}", account.email);
            println!("{}", account.location);
        }
        None => println!("Not signed in"),
    }
}
