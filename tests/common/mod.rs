//! 内存中的假页面，用来在没有浏览器的情况下驱动完整流程

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use exam_harvest::config::{Config, Selectors};
use exam_harvest::error::{HarvestError, HarvestResult};
use exam_harvest::infrastructure::{Locator, PageDriver};
use exam_harvest::models::ExamDataset;

pub const LISTING_URL: &str = "https://practice.test/listing";

/// 测试用配置：超时很短，不做稳定等待
pub fn test_config(output_dir: &Path) -> Config {
    Config {
        listing_url: LISTING_URL.to_string(),
        output_dir: output_dir.join("corpus").to_string_lossy().into_owned(),
        output_log_file: output_dir.join("run.log").to_string_lossy().into_owned(),
        wait_timeout_ms: 60,
        stale_timeout_ms: 20,
        poll_interval_ms: 1,
        duplicate_pause_ms: 1,
        settle_pause_ms: 0,
        max_duplicate_polls: 5,
        ..Config::default()
    }
}

#[derive(Debug, Clone)]
pub enum FakeExplanation {
    /// 按钮可点，弹窗显示这段 HTML
    Dialog(String),
    /// 按钮可点，但弹窗永远不出现
    NoDialog,
}

#[derive(Debug, Clone)]
pub struct FakeVisual {
    pub width: f64,
    pub displayed: bool,
    pub capture_fails: bool,
}

impl FakeVisual {
    pub fn shown(width: f64) -> Self {
        Self {
            width,
            displayed: true,
            capture_fails: false,
        }
    }

    pub fn hidden(width: f64) -> Self {
        Self {
            width,
            displayed: false,
            capture_fails: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeMeta {
    pub domain: String,
    pub skill: String,
    pub difficulty_text: String,
    pub difficulty_aria: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FakeQuestion {
    pub stem: String,
    pub stimulus: Option<String>,
    pub options: Vec<String>,
    pub explanation: Option<FakeExplanation>,
    pub visuals: Vec<FakeVisual>,
    pub meta: Option<FakeMeta>,
}

impl FakeQuestion {
    /// 题干 `<p>{stem}</p>`，四个选项，带解析
    pub fn simple(stem: &str) -> Self {
        Self {
            stem: stem.to_string(),
            stimulus: None,
            options: ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect(),
            explanation: Some(FakeExplanation::Dialog(format!(
                "<h2>Explanation</h2><p>Because of {}</p>",
                stem
            ))),
            visuals: Vec::new(),
            meta: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FakeExam {
    pub title: String,
    pub questions: Vec<FakeQuestion>,
    /// 打开后题目永远不出现
    pub broken: bool,
    /// 是否有"返回列表"按钮
    pub back_control: bool,
    /// 翻页后题干文本仍显示上一题的次数
    pub stale_reads: usize,
}

impl FakeExam {
    pub fn new(title: &str, questions: Vec<FakeQuestion>) -> Self {
        Self {
            title: title.to_string(),
            questions,
            broken: false,
            back_control: true,
            stale_reads: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Row(usize),
    Stem,
    Stimulus,
    Visual(usize),
    AnswerOption(usize),
    Next,
    Back,
    ExplanationButton,
    Dialog,
    InfoPanel,
    Domain,
    Skill,
    Difficulty,
}

/// 假元素：页面每次变化都会换代，旧元素随之失效
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeElement {
    kind: Kind,
    generation: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Blank,
    Listing,
    Exam { exam: usize, question: usize },
}

struct FakeState {
    screen: Screen,
    generation: usize,
    dialog_open: bool,
    pending_stale_reads: usize,
    navigations: Vec<String>,
    back_clicks: usize,
    escapes: usize,
    /// 打开过一张试卷后，列表只剩这么多行
    rows_after_first_visit: Option<usize>,
    visible_rows: Option<usize>,
    /// 翻到这道题（从 0 开始）时让该目录无法写入
    block_persistence: Option<(usize, PathBuf)>,
}

pub struct FakeDriver {
    exams: Vec<FakeExam>,
    selectors: Selectors,
    state: Mutex<FakeState>,
}

impl FakeDriver {
    pub fn new(exams: Vec<FakeExam>) -> Self {
        Self {
            exams,
            selectors: Selectors::default(),
            state: Mutex::new(FakeState {
                screen: Screen::Blank,
                generation: 0,
                dialog_open: false,
                pending_stale_reads: 0,
                navigations: Vec::new(),
                back_clicks: 0,
                escapes: 0,
                rows_after_first_visit: None,
                visible_rows: None,
                block_persistence: None,
            }),
        }
    }

    /// 直接打开某张试卷的第一题
    pub fn open_exam(&self, exam: usize) {
        let mut state = self.state.lock().unwrap();
        state.screen = Screen::Exam { exam, question: 0 };
        state.generation += 1;
    }

    /// 第一张试卷打开后，列表只保留前 `rows` 行
    pub fn shrink_listing_after_first_exam(&self, rows: usize) {
        self.state.lock().unwrap().rows_after_first_visit = Some(rows);
    }

    /// 翻到第 `question` 题（从 0 开始）时，在试卷目录里占住临时文件名，之后的写盘都会失败
    pub fn block_persistence_at(&self, question: usize, exam_dir: &Path) {
        self.state.lock().unwrap().block_persistence = Some((question, exam_dir.to_path_buf()));
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn back_clicks(&self) -> usize {
        self.state.lock().unwrap().back_clicks
    }

    pub fn escapes(&self) -> usize {
        self.state.lock().unwrap().escapes
    }

    pub fn on_listing(&self) -> bool {
        self.state.lock().unwrap().screen == Screen::Listing
    }

    fn kinds_for(&self, locator: &Locator, state: &FakeState) -> Vec<Kind> {
        let s = &self.selectors;
        let selector = locator.as_str();

        let (exam, question) = match state.screen {
            Screen::Blank => return Vec::new(),
            Screen::Listing => {
                if selector == s.listing_rows {
                    let rows = state.visible_rows.unwrap_or(self.exams.len()).min(self.exams.len());
                    return (0..rows).map(Kind::Row).collect();
                }
                return Vec::new();
            }
            Screen::Exam { exam, question } => (exam, question),
        };

        let fake_exam = &self.exams[exam];
        if fake_exam.broken {
            return Vec::new();
        }
        let q = &fake_exam.questions[question];

        if selector == s.question_stem {
            vec![Kind::Stem]
        } else if selector == s.question_stimulus {
            q.stimulus.iter().map(|_| Kind::Stimulus).collect()
        } else if selector == s.stimulus_visuals {
            (0..q.visuals.len()).map(Kind::Visual).collect()
        } else if selector == s.answer_options {
            (0..q.options.len()).map(Kind::AnswerOption).collect()
        } else if selector == s.next_button {
            if question + 1 < fake_exam.questions.len() {
                vec![Kind::Next]
            } else {
                Vec::new()
            }
        } else if selector == s.back_to_listing {
            if fake_exam.back_control {
                vec![Kind::Back]
            } else {
                Vec::new()
            }
        } else if selector == s.explanation_button {
            q.explanation.iter().map(|_| Kind::ExplanationButton).collect()
        } else if selector == s.explanation_dialog {
            if state.dialog_open {
                vec![Kind::Dialog]
            } else {
                Vec::new()
            }
        } else if q.meta.is_some() {
            if selector == s.info_panel {
                vec![Kind::InfoPanel]
            } else if selector == s.meta_domain {
                vec![Kind::Domain]
            } else if selector == s.meta_skill {
                vec![Kind::Skill]
            } else if selector == s.meta_difficulty {
                vec![Kind::Difficulty]
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        }
    }

    /// 当前题目；元素已失效时报错
    fn current(&self, element: &FakeElement, state: &FakeState) -> HarvestResult<(usize, usize)> {
        if element.generation != state.generation {
            return Err(HarvestError::ElementNotFound(format!("{:?} 已失效", element.kind)));
        }
        match state.screen {
            Screen::Exam { exam, question } => Ok((exam, question)),
            _ => Err(HarvestError::ElementNotFound(format!("{:?} 不在试卷页", element.kind))),
        }
    }

    fn question(&self, exam: usize, question: usize) -> &FakeQuestion {
        &self.exams[exam].questions[question]
    }

    fn press(&self, element: &FakeElement) -> HarvestResult<()> {
        let mut state = self.state.lock().unwrap();
        if element.generation != state.generation {
            return Err(HarvestError::ElementNotFound(format!("{:?} 已失效", element.kind)));
        }

        match (element.kind, state.screen) {
            (Kind::Row(exam), Screen::Listing) => {
                state.screen = Screen::Exam { exam, question: 0 };
                state.generation += 1;
                state.dialog_open = false;
                if let Some(rows) = state.rows_after_first_visit.take() {
                    state.visible_rows = Some(rows);
                }
            }
            (Kind::Next, Screen::Exam { exam, question }) => {
                state.screen = Screen::Exam {
                    exam,
                    question: question + 1,
                };
                state.generation += 1;
                state.dialog_open = false;
                state.pending_stale_reads = self.exams[exam].stale_reads;
                if let Some((at, exam_dir)) = &state.block_persistence {
                    if *at == question + 1 {
                        let staging = exam_dir.join(format!("{}.tmp", ExamDataset::DATA_FILE));
                        std::fs::create_dir_all(&staging)
                            .map_err(|e| HarvestError::file(staging.clone(), e))?;
                    }
                }
            }
            (Kind::Back, Screen::Exam { .. }) => {
                state.screen = Screen::Listing;
                state.generation += 1;
                state.back_clicks += 1;
            }
            (Kind::ExplanationButton, Screen::Exam { exam, question }) => {
                if let Some(FakeExplanation::Dialog(_)) = &self.question(exam, question).explanation {
                    state.dialog_open = true;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> HarvestResult<()> {
        let mut state = self.state.lock().unwrap();
        state.navigations.push(url.to_string());
        state.screen = if url == LISTING_URL {
            Screen::Listing
        } else {
            Screen::Blank
        };
        state.generation += 1;
        state.dialog_open = false;
        Ok(())
    }

    async fn find_one(&self, locator: &Locator) -> HarvestResult<Option<FakeElement>> {
        Ok(self.find_all(locator).await?.into_iter().next())
    }

    async fn find_all(&self, locator: &Locator) -> HarvestResult<Vec<FakeElement>> {
        let state = self.state.lock().unwrap();
        Ok(self
            .kinds_for(locator, &state)
            .into_iter()
            .map(|kind| FakeElement {
                kind,
                generation: state.generation,
            })
            .collect())
    }

    async fn click(&self, element: &FakeElement) -> HarvestResult<()> {
        self.press(element)
    }

    async fn script_click(&self, element: &FakeElement) -> HarvestResult<()> {
        self.press(element)
    }

    async fn text(&self, element: &FakeElement) -> HarvestResult<String> {
        let mut state = self.state.lock().unwrap();
        if let Kind::Row(exam) = element.kind {
            let fake_exam = &self.exams[exam];
            return Ok(format!(
                "{}\tMath\t{} questions",
                fake_exam.title,
                fake_exam.questions.len()
            ));
        }

        let (exam, question) = self.current(element, &state)?;
        let q = self.question(exam, question);
        let text = match element.kind {
            Kind::Stem => {
                if state.pending_stale_reads > 0 && question > 0 {
                    state.pending_stale_reads -= 1;
                    self.question(exam, question - 1).stem.clone()
                } else {
                    q.stem.clone()
                }
            }
            Kind::Stimulus => q.stimulus.clone().unwrap_or_default(),
            Kind::Domain => q.meta.as_ref().map(|m| m.domain.clone()).unwrap_or_default(),
            Kind::Skill => q.meta.as_ref().map(|m| m.skill.clone()).unwrap_or_default(),
            Kind::Difficulty => q
                .meta
                .as_ref()
                .map(|m| m.difficulty_text.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        Ok(text)
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> HarvestResult<Option<String>> {
        let state = self.state.lock().unwrap();
        let (exam, question) = self.current(element, &state)?;
        if element.kind == Kind::Difficulty && name == "aria-label" {
            return Ok(self
                .question(exam, question)
                .meta
                .as_ref()
                .and_then(|m| m.difficulty_aria.clone()));
        }
        Ok(None)
    }

    async fn inner_html(&self, element: &FakeElement) -> HarvestResult<String> {
        let state = self.state.lock().unwrap();
        let (exam, question) = self.current(element, &state)?;
        let q = self.question(exam, question);
        let html = match element.kind {
            Kind::Stem => format!("<p>{}</p>", q.stem),
            Kind::Stimulus => q.stimulus.clone().unwrap_or_default(),
            Kind::AnswerOption(i) => q.options[i].clone(),
            Kind::Dialog => match &q.explanation {
                Some(FakeExplanation::Dialog(html)) => html.clone(),
                _ => String::new(),
            },
            _ => String::new(),
        };
        Ok(html)
    }

    async fn is_displayed(&self, element: &FakeElement) -> HarvestResult<bool> {
        let state = self.state.lock().unwrap();
        if element.generation != state.generation {
            return Ok(false);
        }
        match (element.kind, state.screen) {
            (Kind::Visual(i), Screen::Exam { exam, question }) => {
                Ok(self.question(exam, question).visuals[i].displayed)
            }
            (Kind::Dialog, _) => Ok(state.dialog_open),
            _ => Ok(true),
        }
    }

    async fn rendered_width(&self, element: &FakeElement) -> HarvestResult<f64> {
        let state = self.state.lock().unwrap();
        let (exam, question) = self.current(element, &state)?;
        match element.kind {
            Kind::Visual(i) => Ok(self.question(exam, question).visuals[i].width),
            _ => Ok(600.0),
        }
    }

    async fn is_attached(&self, element: &FakeElement) -> HarvestResult<bool> {
        Ok(element.generation == self.state.lock().unwrap().generation)
    }

    async fn scroll_into_view(&self, _element: &FakeElement) -> HarvestResult<()> {
        Ok(())
    }

    async fn capture_png(&self, element: &FakeElement, path: &Path) -> HarvestResult<()> {
        let fails = {
            let state = self.state.lock().unwrap();
            let (exam, question) = self.current(element, &state)?;
            match element.kind {
                Kind::Visual(i) => self.question(exam, question).visuals[i].capture_fails,
                _ => false,
            }
        };
        if fails {
            return Err(HarvestError::Script("截图返回空数据".to_string()));
        }
        std::fs::write(path, b"\x89PNG\r\n\x1a\n").map_err(|e| HarvestError::file(PathBuf::from(path), e))
    }

    async fn press_escape(&self) -> HarvestResult<()> {
        let mut state = self.state.lock().unwrap();
        state.dialog_open = false;
        state.escapes += 1;
        Ok(())
    }
}
