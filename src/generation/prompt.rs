//! Prompt text for the posting request.
//!
//! The wording is copywriting content, not a contract: nothing downstream
//! checks post length, hashtag count or tone. Deployments can swap the whole
//! template through `prompt.template_path`.

use super::types::LectureInfo;
use crate::{
    Error, Result,
    llm::{OutputSchema, SchemaField},
};
use handlebars::Handlebars;
use std::path::Path;

const TEMPLATE_NAME: &str = "posts";

pub const DEFAULT_TEMPLATE: &str = r#"당신은 '가치있는 미래교육연구소' 대표이자 중등 미술교사 출신의 리더십/에듀테크/생성형 AI 전문 강사 김병찬 님의 전담 퍼스널 브랜딩 작가입니다.
다음 강의 정보를 바탕으로 인스타그램과 네이버 블로그용 홍보 포스팅을 작성해주세요.

[강의 정보]
- 출강 장소: {{location}}
- 출강 일시: {{dateTime}}
- 강의 대상: {{target}}
- 강의 주제: {{topic}}
- 현장 반응 및 특이사항: {{reaction}}

[공통 요구사항]
- 페르소나: 따뜻하고 전문적인 교육 전문가, 디지털 전환을 선도하는 혁신가.
- 어조: 매우 친근하고 자연스러우며 진정성이 느껴지는 말투.
- 줄바꿈을 자주 사용하여 모바일에서도 읽기 편하게 가독성을 극대화하세요.

[인스타그램 포스팅 조건]
- 감각적이고 세련된 첫 문장으로 시선 강탈.
- 현장의 에너지가 느껴지는 생생한 묘사.
- 해시태그는 정확히 5개만 생성 (강의 요청이 많이 들어올 수 있는 고효율 키워드 위주).

[네이버 블로그 포스팅 조건 - 중요: 분량 대폭 확대]
- 매우 풍성하고 구체적인 내용을 포함하세요 (최소 1,500자 이상의 긴 호흡).
- 마치 옆에서 이야기해주는 것처럼 다정한 말투(~해요, ~했어요) 사용.
- 도입부: 강의를 가게 된 설렘과 장소에 대한 느낌.
- 본문: 강의 주제의 중요성, 준비 과정, 교육생들과의 호흡, 구체적인 활동 내용 묘사.
- 현장 반응: 교육생들의 질문이나 반응을 에피소드 형식으로 풍부하게 서술.
- 마무리: 교육자로서 느끼는 보람과 미래 교육에 대한 가치 전달.
- 이모티콘(블로그 스티커 느낌)을 문장 사이사이에 아주 풍부하게 사용하여 친근감 유발.
- 마지막에 네이버 블로그 검색 상위 노출을 위한 최적화 해시태그 10개 이상 포함.

응답은 반드시 아래 JSON 구조로만 답변하세요:
{
  "instagram": "인스타그램 포스팅 내용",
  "naverBlog": "네이버 블로그 포스팅 내용"
}
"#;

#[derive(Debug, Clone)]
pub struct PromptTemplate {
    registry: Handlebars<'static>,
}

impl PromptTemplate {
    pub fn builtin() -> Result<Self> {
        Self::from_source(DEFAULT_TEMPLATE)
    }

    pub fn from_source(source: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Prompts are plain text; user input goes in verbatim
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, source)
            .map_err(|e| Error::config(format!("Invalid prompt template: {}", e)))?;

        Ok(Self { registry })
    }

    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read prompt template {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_source(&source)
    }

    pub fn render(&self, info: &LectureInfo) -> Result<String> {
        Ok(self.registry.render(TEMPLATE_NAME, info)?)
    }
}

/// `{ instagram: string, naverBlog: string }`, both required.
pub fn post_schema() -> OutputSchema {
    OutputSchema::new(
        "lecture_posts",
        vec![
            SchemaField::new("instagram").with_description("인스타그램 포스팅 내용"),
            SchemaField::new("naverBlog").with_description("네이버 블로그 포스팅 내용"),
        ],
    )
}
