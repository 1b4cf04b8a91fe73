use super::admin::{log_failure, AdminService};
use crate::error::Result;
use crate::models::{Video, VideoInput};
use crate::validation;
use tracing::info;

impl AdminService {
    pub async fn add_video(&self, input: VideoInput) -> Result<Video> {
        const OP: &str = "add_video";

        validation::validate_video(&input.name, &input.url, &input.img_url, &input.category_ids)?;
        let video = self
            .store()
            .add_video(&input)
            .await
            .map_err(|e| log_failure(OP, None, e))?;

        info!(video_id = video.id, categories = video.categories.len(), "Video created");
        self.invalidate(OP);
        Ok(video)
    }

    pub async fn get_video(&self, id: i64) -> Result<Video> {
        validation::validate_id(id)?;
        self.store()
            .get_video(id)
            .await
            .map_err(|e| log_failure("get_video", Some(id), e))
    }

    pub async fn list_videos(&self) -> Result<Vec<Video>> {
        self.store()
            .list_videos()
            .await
            .map_err(|e| log_failure("list_videos", None, e))
    }

    pub async fn update_video(&self, id: i64, input: VideoInput) -> Result<Video> {
        const OP: &str = "update_video";

        validation::validate_id(id)?;
        validation::validate_video(&input.name, &input.url, &input.img_url, &input.category_ids)?;
        let video = self
            .store()
            .update_video(id, &input)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(video_id = id, "Video updated");
        self.invalidate(OP);
        Ok(video)
    }

    pub async fn delete_video(&self, id: i64) -> Result<()> {
        const OP: &str = "delete_video";

        validation::validate_id(id)?;
        self.store()
            .delete_video(id)
            .await
            .map_err(|e| log_failure(OP, Some(id), e))?;

        info!(video_id = id, "Video deleted");
        self.invalidate(OP);
        Ok(())
    }

    pub async fn add_video_categories(&self, video_id: i64, category_ids: &[i64]) -> Result<()> {
        const OP: &str = "add_video_categories";

        validation::validate_id(video_id)?;
        validation::validate_video_categories(category_ids)?;
        self.store()
            .add_video_categories(video_id, category_ids)
            .await
            .map_err(|e| log_failure(OP, Some(video_id), e))?;

        info!(video_id, categories = category_ids.len(), "Video categories added");
        self.invalidate(OP);
        Ok(())
    }

    pub async fn delete_video_categories(&self, video_id: i64) -> Result<u64> {
        const OP: &str = "delete_video_categories";

        validation::validate_id(video_id)?;
        let removed = self
            .store()
            .delete_video_categories(video_id)
            .await
            .map_err(|e| log_failure(OP, Some(video_id), e))?;

        info!(video_id, removed, "Video categories removed");
        self.invalidate(OP);
        Ok(removed)
    }
}
