use super::admin::{log_failure, AdminService};
use crate::error::{CatalogError, Result, ValidationError};
use crate::models::{Account, AccountInput};
use crate::security::hash_password;
use crate::validation;
use tracing::{info, warn};

/// Swap the plaintext password for its stored form, leaving an empty one empty
fn with_hashed_password(input: AccountInput) -> AccountInput {
    let password = if input.password.is_empty() {
        String::new()
    } else {
        hash_password(&input.password)
    };
    AccountInput { password, ..input }
}

impl AdminService {
    pub async fn add_account(&self, input: AccountInput) -> Result<Account> {
        const OP: &str = "add_account";

        validation::validate_account(
            &input.username,
            input.content_type_id,
            &input.password,
            input.is_admin,
        )?;
        let account = self
            .store()
            .add_account(&with_hashed_password(input))
            .await
            .map_err(|e| log_failure(OP, None, e))?;

        info!(account_id = account.id, is_admin = account.is_admin, "Account created");
        self.invalidate(OP);
        Ok(account)
    }

    pub async fn get_account(&self, id: i64) -> Result<Account> {
        validation::validate_id(id)?;
        self.store()
            .get_account(id)
            .await
            .map_err(|e| log_failure("get_account", Some(id), e))
    }

    pub async fn list_accounts(&self) -> Result<Vec<Account>> {
        self.store()
            .list_accounts()
            .await
            .map_err(|e| log_failure("list_accounts", None, e))
    }

    /// An empty password keeps the stored one
    pub async fn update_account(&self, id: i64, input: AccountInput) -> Result<Account> {
        const OP: &str = "update_account";

        validation::validate_id(id)?;
        // Admin password presence is checked against the stored row
        validation::validate_account(&input.username, input.content_type_id, "", false)?;
        let account = self
            .store()
            .update_account(id, &with_hashed_password(input))
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(account_id = id, "Account updated");
        self.invalidate(OP);
        Ok(account)
    }

    pub async fn delete_account(&self, id: i64) -> Result<()> {
        const OP: &str = "delete_account";

        validation::validate_id(id)?;
        self.store()
            .delete_account(id)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(account_id = id, "Account deleted");
        self.invalidate(OP);
        Ok(())
    }

    /// Check admin credentials; `password` is plaintext and hashed here
    pub async fn verify_admin(&self, username: &str, password: &str) -> Result<Account> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyUsername.into());
        }
        if password.is_empty() {
            return Err(ValidationError::EmptyPasswordForAdmin.into());
        }

        match self.store().find_admin(username, &hash_password(password)).await {
            Ok(account) => Ok(account),
            Err(err @ CatalogError::NotFound { .. }) => {
                warn!(username = %username, "Admin credential check failed");
                Err(err)
            }
            Err(err) => Err(log_failure("verify_admin", None, err)),
        }
    }
}
