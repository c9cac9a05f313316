//! Sources of secret material
//!
//! The secrets password (and, for `add-secret`, the secret value) comes from
//! a configured environment variable when set, otherwise from a masked
//! prompt. The environment is handed in as a snapshot so nothing here reads
//! process state directly.

use crate::config::SecretsConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use zeroize::Zeroizing;

/// Reject passwords shorter than `min_length` characters
pub fn validate_password(password: &str, min_length: usize) -> Result<()> {
    let got = password.chars().count();
    if got < min_length {
        return Err(Error::PasswordTooShort {
            min: min_length,
            got,
        });
    }
    Ok(())
}

/// Masked interactive input
pub trait Prompter {
    fn prompt_masked(&mut self, message: &str) -> Result<String>;
}

/// Prompter reading from the controlling terminal without echo
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt_masked(&mut self, message: &str) -> Result<String> {
        Ok(rpassword::prompt_password(message)?)
    }
}

/// Provides the secrets password and new secret values
pub trait CredentialsProvider {
    /// Password protecting every secret of a manifest, already validated
    fn secrets_password(&mut self, prompt: &str) -> Result<Zeroizing<String>>;

    /// Cleartext value of a secret being added
    fn secret_value(&mut self, prompt: &str) -> Result<Zeroizing<String>>;
}

/// Environment first, then prompt
pub struct ConsoleCredentials<P: Prompter> {
    /// Only the configured password and value variables, wiped on drop
    env: HashMap<String, Zeroizing<String>>,
    settings: SecretsConfig,
    prompter: P,
}

impl<P: Prompter> ConsoleCredentials<P> {
    /// Keep the configured variables out of `env`; everything else is dropped
    pub fn new(env: HashMap<String, String>, settings: SecretsConfig, prompter: P) -> Self {
        let env = env
            .into_iter()
            .filter(|(name, _)| *name == settings.password_env || *name == settings.secret_value_env)
            .map(|(name, value)| (name, Zeroizing::new(value)))
            .collect();

        ConsoleCredentials {
            env,
            settings,
            prompter,
        }
    }

    fn lookup(&mut self, var: &str, prompt: &str) -> Result<Zeroizing<String>> {
        if let Some(value) = self.env.get(var) {
            tracing::debug!("Using value from {}", var);
            return Ok(value.clone());
        }
        Ok(Zeroizing::new(self.prompter.prompt_masked(prompt)?))
    }
}

impl<P: Prompter> CredentialsProvider for ConsoleCredentials<P> {
    fn secrets_password(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        let var = self.settings.password_env.clone();
        let password = self.lookup(&var, prompt)?;
        validate_password(&password, self.settings.min_password_length)?;
        Ok(password)
    }

    fn secret_value(&mut self, prompt: &str) -> Result<Zeroizing<String>> {
        let var = self.settings.secret_value_env.clone();
        self.lookup(&var, prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedPrompter {
        answers: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Self {
            ScriptedPrompter {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Prompter for &mut ScriptedPrompter {
        fn prompt_masked(&mut self, message: &str) -> Result<String> {
            self.prompts.push(message.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| Error::Internal("no scripted answer".to_string()))
        }
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("/abcdef123456!", 12).is_ok());

        let err = validate_password("abcdef", 12).unwrap_err();
        assert_eq!(err.to_string(), "a secret should have a minimum length of 12, got 6");
    }

    #[test]
    fn test_password_counts_characters() {
        assert!(validate_password("ééééééééééé", 12).is_err());
        assert!(validate_password("éééééééééééé", 12).is_ok());
    }

    #[test]
    fn test_env_password_wins() {
        let settings = SecretsConfig::default();
        let env = HashMap::from([(settings.password_env.clone(), "P@ssw0rd!from-env".to_string())]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let mut credentials = ConsoleCredentials::new(env, settings, &mut prompter);
        let password = credentials.secrets_password("Password: ").unwrap();
        assert_eq!(password.as_str(), "P@ssw0rd!from-env");
        assert!(prompter.prompts.is_empty());
    }

    #[test]
    fn test_keeps_only_configured_variables() {
        let settings = SecretsConfig::default();
        let env = HashMap::from([
            (settings.password_env.clone(), "P@ssw0rd!from-env".to_string()),
            ("HOME".to_string(), "/home/someone".to_string()),
            ("AWS_SECRET_ACCESS_KEY".to_string(), "unrelated".to_string()),
        ]);
        let mut prompter = ScriptedPrompter::new(&[]);

        let credentials = ConsoleCredentials::new(env, settings.clone(), &mut prompter);
        assert_eq!(credentials.env.len(), 1);
        assert!(credentials.env.contains_key(&settings.password_env));
    }

    #[test]
    fn test_prompts_when_env_missing() {
        let mut prompter = ScriptedPrompter::new(&["prompted-password"]);
        let mut credentials =
            ConsoleCredentials::new(HashMap::new(), SecretsConfig::default(), &mut prompter);

        let password = credentials.secrets_password("Secrets Password: ").unwrap();
        assert_eq!(password.as_str(), "prompted-password");
        assert_eq!(prompter.prompts, vec!["Secrets Password: "]);
    }

    #[test]
    fn test_short_password_rejected_from_any_source() {
        let mut prompter = ScriptedPrompter::new(&["short"]);
        let mut credentials =
            ConsoleCredentials::new(HashMap::new(), SecretsConfig::default(), &mut prompter);
        assert!(matches!(
            credentials.secrets_password("Password: "),
            Err(Error::PasswordTooShort { min: 12, got: 5 })
        ));

        let settings = SecretsConfig::default();
        let env = HashMap::from([(settings.password_env.clone(), "tiny".to_string())]);
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut credentials = ConsoleCredentials::new(env, settings, &mut prompter);
        assert!(matches!(
            credentials.secrets_password("Password: "),
            Err(Error::PasswordTooShort { .. })
        ));
    }

    #[test]
    fn test_secret_value_not_length_checked() {
        let settings = SecretsConfig::default();
        let env = HashMap::from([(settings.secret_value_env.clone(), "v".to_string())]);
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut credentials = ConsoleCredentials::new(env, settings, &mut prompter);

        assert_eq!(credentials.secret_value("Value: ").unwrap().as_str(), "v");
    }
}
