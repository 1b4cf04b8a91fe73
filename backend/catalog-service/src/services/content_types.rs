use super::admin::{log_failure, AdminService};
use crate::error::Result;
use crate::models::ContentType;
use crate::validation;
use tracing::info;

impl AdminService {
    pub async fn add_content_type(&self, name: &str) -> Result<ContentType> {
        const OP: &str = "add_content_type";

        validation::validate_content_type(name)?;
        let content_type = self
            .store()
            .add_content_type(name)
            .await
            .map_err(|e| log_failure(OP, None, e))?;

        info!(content_type_id = content_type.id, "Content type created");
        self.invalidate(OP);
        Ok(content_type)
    }

    pub async fn get_content_type(&self, id: i64) -> Result<ContentType> {
        validation::validate_id(id)?;
        self.store()
            .get_content_type(id)
            .await
            .map_err(|e| log_failure("get_content_type", Some(id), e))
    }

    pub async fn list_content_types(&self) -> Result<Vec<ContentType>> {
        self.store()
            .list_content_types()
            .await
            .map_err(|e| log_failure("list_content_types", None, e))
    }

    pub async fn update_content_type(&self, id: i64, name: &str) -> Result<ContentType> {
        const OP: &str = "update_content_type";

        validation::validate_id(id)?;
        validation::validate_content_type(name)?;
        let content_type = self
            .store()
            .update_content_type(id, name)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(content_type_id = id, "Content type updated");
        self.invalidate(OP);
        Ok(content_type)
    }

    pub async fn delete_content_type(&self, id: i64) -> Result<()> {
        const OP: &str = "delete_content_type";

        validation::validate_id(id)?;
        self.store()
            .delete_content_type(id)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(content_type_id = id, "Content type deleted");
        self.invalidate(OP);
        Ok(())
    }
}
