use esign_rs::{ClientContext, Credentials, Environment, Error, JwtBootstrap, OAuthClient};
use std::env;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let integrator_key = match env::var("ESIGN_INTEGRATOR_KEY") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("ESIGN_INTEGRATOR_KEY is not set. Skipping.");
            return Ok(());
        }
    };
    let user_id = match env::var("ESIGN_USER_ID") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("ESIGN_USER_ID is not set. Skipping.");
            return Ok(());
        }
    };
    let key_path = match env::var("ESIGN_PRIVATE_KEY_PEM") {
        Ok(value) => value,
        Err(_) => {
            eprintln!("ESIGN_PRIVATE_KEY_PEM is not set. Skipping.");
            eprintln!("Example: ESIGN_PRIVATE_KEY_PEM=/path/private.pem");
            return Ok(());
        }
    };
    let redirect_uri =
        env::var("ESIGN_REDIRECT_URI").unwrap_or_else(|_| "https://localhost".to_string());

    let private_key_pem = fs::read(key_path)?;
    let credentials = Credentials::new(
        integrator_key,
        user_id,
        redirect_uri,
        private_key_pem,
        vec!["signature".to_string(), "impersonation".to_string()],
        3600,
    )?;

    let context = ClientContext::new(Environment::Demo);
    let client = OAuthClient::for_environment(Environment::Demo)?;

    match JwtBootstrap::new(context.clone(), credentials).run(&client) {
        Ok(outcome) => {
            println!("account: {}", outcome.account_id);
            println!("base path: {}", outcome.base_path);
            println!("token expires in: {}s", outcome.token.expires_in);
        }
        Err(Error::ConsentRequired { consent_uri }) => {
            eprintln!("consent has not been granted yet; visit once:");
            eprintln!("{consent_uri}");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
