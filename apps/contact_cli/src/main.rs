use anyhow::{bail, Result};
use clap::Parser;
use client_core::{contact_endpoint, FormController, FormError, FormFields, SubmitStatus};

/// Submits the site's contact form from the command line.
#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the site, e.g. http://127.0.0.1:3000
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    site_url: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long)]
    message: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let controller = FormController::new(contact_endpoint(&args.site_url)?);
    controller
        .set_fields(FormFields {
            name: args.name,
            email: args.email,
            phone: args.phone,
            message: args.message,
        })
        .await;

    match controller.submit().await {
        Ok(SubmitStatus::Success) => {
            println!("Thank you! Your message has been sent successfully.");
            Ok(())
        }
        Ok(_) => bail!("Failed to send message. Please try again later."),
        Err(FormError::Invalid(errors)) => {
            for message in [errors.name, errors.email, errors.message]
                .into_iter()
                .flatten()
            {
                eprintln!("{message}");
            }
            bail!("form is invalid")
        }
        Err(err) => Err(err.into()),
    }
}
