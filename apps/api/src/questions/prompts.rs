// LLM prompt templates for question generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Question batch prompt.
/// Replace: {persona}, {count}, {easy}, {medium}, {hard}, {category}, {json_only}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"{persona}
현재 채용 트렌드에 맞는 실제적인 면접 질문 {count}개를 생성해주세요.

조건:
1. 실무 경험을 평가할 수 있는 구체적인 질문
2. 해당 직무의 핵심 역량을 다루는 질문
3. 최신 기술/트렌드가 반영된 질문
4. 난이도: 쉬움 {easy}개, 보통 {medium}개, 어려움 {hard}개
5. 질문은 15-150자 사이로 작성
6. 한국어로 작성

{json_only}
반드시 다음 JSON 배열 형식으로만 반환해주세요:
[
  {"question": "질문 내용", "difficulty": "easy|medium|hard", "category": "{category}"}
]"#;
