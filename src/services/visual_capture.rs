//! 图片截取 - 业务能力层
//!
//! 只截取材料区里当前可见、且宽度超过阈值的图形元素

use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::infrastructure::{Locator, PageDriver};
use crate::models::ExamDataset;
use crate::workflow::QuestionCtx;

/// 图片截取服务
pub struct VisualCapture {
    visuals: Locator,
    min_width: f64,
    settle: Duration,
}

impl VisualCapture {
    pub fn new(config: &Config) -> Self {
        Self {
            visuals: Locator::parse(&config.selectors.stimulus_visuals),
            min_width: config.min_visual_width,
            settle: config.settle_pause(),
        }
    }

    /// 截图并返回相对试卷目录的路径
    ///
    /// 文件名 `Q<题号>_<序号>.png`，序号按成功截取的图片从 1 计数。
    pub async fn capture<D: PageDriver>(
        &self,
        driver: &D,
        ctx: &QuestionCtx,
        image_dir: &Path,
    ) -> Vec<String> {
        let candidates = match driver.find_all(&self.visuals).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("{} ⚠️ 查找图片失败: {}", ctx, e);
                return Vec::new();
            }
        };

        let mut paths = Vec::new();
        for element in candidates {
            if !self.qualifies(driver, &element).await {
                continue;
            }

            let file_name = image_file_name(ctx.question_index, paths.len() + 1);
            let target = image_dir.join(&file_name);

            if let Err(e) = driver.scroll_into_view(&element).await {
                debug!("{} 滚动到图片失败: {}", ctx, e);
            }
            sleep(self.settle).await;

            match driver.capture_png(&element, &target).await {
                Ok(()) => {
                    debug!("{} 已保存图片: {}", ctx, target.display());
                    paths.push(ExamDataset::relative_image_path(&file_name));
                }
                Err(e) => warn!("{} ⚠️ 截图失败 {}: {}", ctx, file_name, e),
            }
        }

        if !paths.is_empty() {
            info!("{} 🖼️ 截取图片 {} 张", ctx, paths.len());
        }
        paths
    }

    async fn qualifies<D: PageDriver>(&self, driver: &D, element: &D::Element) -> bool {
        if !driver.is_displayed(element).await.unwrap_or(false) {
            return false;
        }
        driver
            .rendered_width(element)
            .await
            .map(|width| width > self.min_width)
            .unwrap_or(false)
    }
}

pub fn image_file_name(question_index: usize, sequence: usize) -> String {
    format!("Q{}_{}.png", question_index, sequence)
}
