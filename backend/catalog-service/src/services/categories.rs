use super::admin::{log_failure, AdminService};
use crate::error::Result;
use crate::models::{Category, CategoryInput};
use crate::validation;
use tracing::info;

impl AdminService {
    pub async fn add_category(&self, input: CategoryInput) -> Result<Category> {
        const OP: &str = "add_category";

        validation::validate_category(&input.name, &input.img_url, &input.content_type_ids)?;
        let category = self
            .store()
            .add_category(&input)
            .await
            .map_err(|e| log_failure(OP, None, e))?;

        info!(
            category_id = category.id,
            content_types = category.content_types.len(),
            "Category created"
        );
        self.invalidate(OP);
        Ok(category)
    }

    pub async fn get_category(&self, id: i64) -> Result<Category> {
        validation::validate_id(id)?;
        self.store()
            .get_category(id)
            .await
            .map_err(|e| log_failure("get_category", Some(id), e))
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.store()
            .list_categories()
            .await
            .map_err(|e| log_failure("list_categories", None, e))
    }

    /// `input.content_type_ids` becomes the complete association set
    pub async fn update_category(&self, id: i64, input: CategoryInput) -> Result<Category> {
        const OP: &str = "update_category";

        validation::validate_id(id)?;
        validation::validate_category(&input.name, &input.img_url, &input.content_type_ids)?;
        let category = self
            .store()
            .update_category(id, &input)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(category_id = id, "Category updated");
        self.invalidate(OP);
        Ok(category)
    }

    pub async fn delete_category(&self, id: i64) -> Result<()> {
        const OP: &str = "delete_category";

        validation::validate_id(id)?;
        self.store()
            .delete_category(id)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(category_id = id, "Category deleted");
        self.invalidate(OP);
        Ok(())
    }
}
