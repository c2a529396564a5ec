use std::fmt;

use secrecy::SecretString;

use crate::{Prompt, StravaError};

pub const CLIENT_ID_ENV: &str = "CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "CLIENT_SECRET";

/// API application credentials, resolved once per run and never stored.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Argument,
    Environment,
    Prompt,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argument => f.write_str("argument"),
            Self::Environment => f.write_str("environment"),
            Self::Prompt => f.write_str("prompt"),
        }
    }
}

/// Values supplied on the command line; empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct CredentialArgs {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Credentials {
    /// Resolves each field from `args`, then `env`, then `prompt`.
    ///
    /// Pass `|_| None` as `env` to skip the environment entirely.
    pub fn resolve<F, P>(
        args: CredentialArgs,
        mut env: F,
        prompt: &mut P,
    ) -> Result<Self, StravaError>
    where
        F: FnMut(&str) -> Option<String>,
        P: Prompt + ?Sized,
    {
        let client_id = resolve_field(
            Field::ClientId,
            args.client_id,
            env(CLIENT_ID_ENV),
            prompt,
        )?;
        let client_secret = resolve_field(
            Field::ClientSecret,
            args.client_secret,
            env(CLIENT_SECRET_ENV),
            prompt,
        )?;

        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret.into()),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    ClientId,
    ClientSecret,
}

impl Field {
    fn label(self) -> &'static str {
        match self {
            Self::ClientId => "Client ID",
            Self::ClientSecret => "Client Secret",
        }
    }
}

fn resolve_field<P>(
    field: Field,
    argument: Option<String>,
    environment: Option<String>,
    prompt: &mut P,
) -> Result<String, StravaError>
where
    P: Prompt + ?Sized,
{
    let label = field.label();
    let (value, source) = if let Some(value) = non_empty(argument) {
        println!("\nUsing Strava {label} provided as an argument.");
        (value, CredentialSource::Argument)
    } else if let Some(value) = non_empty(environment) {
        println!("\nUsing Strava {label} from environment.");
        (value, CredentialSource::Environment)
    } else {
        println!("\nNo Strava {label} found. Prompting for input...");
        let question = format!("Enter your Strava {label}: ");
        let value = match field {
            Field::ClientId => prompt.ask(&question)?,
            Field::ClientSecret => prompt.ask_secret(&question)?,
        };
        (value.trim().to_string(), CredentialSource::Prompt)
    };
    tracing::debug!(field = label, %source, "credential resolved");
    Ok(value)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
