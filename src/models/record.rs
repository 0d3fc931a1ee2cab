use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarvestError, HarvestResult};

/// 单道题目的导出记录
///
/// 字段顺序即 JSON 输出顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// "Q1"、"Q2" …，卷内从 1 递增
    pub id: String,
    /// "领域: 技能"，可能为空
    pub question_type: String,
    pub difficulty: String,
    pub question_text: String,
    /// 至多 4 项，"A) …" 到 "D) …"
    pub options: Vec<String>,
    /// 解析文本，或固定的错误占位串
    pub solution_rationale: String,
    /// 相对试卷目录的图片路径
    pub image_paths: Vec<String>,
}

impl QuestionRecord {
    /// 题号 → 记录 id
    pub fn question_id(question_index: usize) -> String {
        format!("Q{}", question_index)
    }
}

/// 一张试卷的导出数据
///
/// 每追加一条记录就整体重写 `questions.json`：
/// 第 k 题处理完后，磁盘上恰好有 k 条完整记录。
#[derive(Debug)]
pub struct ExamDataset {
    exam_name: String,
    exam_dir: PathBuf,
    image_directory: PathBuf,
    records: Vec<QuestionRecord>,
}

impl ExamDataset {
    pub const DATA_FILE: &'static str = "questions.json";
    pub const IMAGE_DIR: &'static str = "images";

    /// 在输出目录下创建试卷目录和图片目录
    pub async fn create(output_dir: &Path, label: &str) -> HarvestResult<Self> {
        let exam_name = sanitize_exam_name(label);
        let exam_dir = output_dir.join(&exam_name);
        let image_directory = exam_dir.join(Self::IMAGE_DIR);

        tokio::fs::create_dir_all(&image_directory)
            .await
            .map_err(|e| HarvestError::file(&image_directory, e))?;
        debug!("试卷目录已就绪: {}", exam_dir.display());

        Ok(Self {
            exam_name,
            exam_dir,
            image_directory,
            records: Vec::new(),
        })
    }

    pub fn exam_name(&self) -> &str {
        &self.exam_name
    }

    pub fn exam_dir(&self) -> &Path {
        &self.exam_dir
    }

    pub fn image_directory(&self) -> &Path {
        &self.image_directory
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn data_file(&self) -> PathBuf {
        self.exam_dir.join(Self::DATA_FILE)
    }

    /// 图片相对试卷目录的路径
    pub fn relative_image_path(file_name: &str) -> String {
        format!("{}/{}", Self::IMAGE_DIR, file_name)
    }

    /// 追加记录并重写整个文件；写盘失败时内存中的列表保持不变
    pub async fn push(&mut self, record: QuestionRecord) -> HarvestResult<()> {
        self.records.push(record);
        if let Err(e) = self.persist().await {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// 先写临时文件再改名，中途崩溃不会留下半个数组
    async fn persist(&self) -> HarvestResult<()> {
        let json = serde_json::to_string_pretty(&self.records)?;
        let target = self.data_file();
        let staging = self.exam_dir.join(format!("{}.tmp", Self::DATA_FILE));

        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| HarvestError::file(&staging, e))?;
        tokio::fs::rename(&staging, &target)
            .await
            .map_err(|e| HarvestError::file(&target, e))?;

        debug!("已写入 {} 条记录: {}", self.records.len(), target.display());
        Ok(())
    }
}

/// 读取已导出的记录
pub async fn load_records(path: &Path) -> HarvestResult<Vec<QuestionRecord>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| HarvestError::file(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// 去掉文件系统非法字符；结果为空时使用 "Exam"
pub fn sanitize_exam_name(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '*' | '?' | ':' | '"' | '<' | '>' | '|') && !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.').trim();
    if cleaned.is_empty() {
        "Exam".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize) -> QuestionRecord {
        QuestionRecord {
            id: QuestionRecord::question_id(index),
            question_type: String::new(),
            difficulty: String::new(),
            question_text: format!("question {}", index),
            options: vec!["A) 1".to_string(), "B) 2".to_string()],
            solution_rationale: "because".to_string(),
            image_paths: Vec::new(),
        }
    }

    #[test]
    fn test_sanitize_exam_name() {
        assert_eq!(sanitize_exam_name(r#"Practice <Test> 1: "Math"/RW?"#), "Practice Test 1 MathRW");
        assert_eq!(sanitize_exam_name("a\\b|c*d"), "abcd");
        assert_eq!(sanitize_exam_name("  ?:*  "), "Exam");
        assert_eq!(sanitize_exam_name("Line\nBreak"), "LineBreak");
    }

    #[test]
    fn test_record_field_order() {
        let json = serde_json::to_string(&record(1)).unwrap();
        let keys = [
            "\"id\"",
            "\"question_type\"",
            "\"difficulty\"",
            "\"question_text\"",
            "\"options\"",
            "\"solution_rationale\"",
            "\"image_paths\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", json);
    }

    #[tokio::test]
    async fn test_persisted_length_tracks_each_push() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = ExamDataset::create(dir.path(), "Exam_1: Math").await.unwrap();

        assert_eq!(dataset.exam_name(), "Exam_1 Math");
        assert!(dataset.image_directory().is_dir());

        for k in 1..=3 {
            dataset.push(record(k)).await.unwrap();
            let on_disk = load_records(&dataset.data_file()).await.unwrap();
            assert_eq!(on_disk.len(), k);
            assert_eq!(on_disk.as_slice(), dataset.records());
        }
        assert!(!dataset.exam_dir().join("questions.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_memory_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = ExamDataset::create(dir.path(), "Broken").await.unwrap();
        dataset.push(record(1)).await.unwrap();

        // 目录被删后写盘失败
        std::fs::remove_dir_all(dataset.exam_dir()).unwrap();
        assert!(dataset.push(record(2)).await.is_err());
        assert_eq!(dataset.len(), 1);
    }
}
