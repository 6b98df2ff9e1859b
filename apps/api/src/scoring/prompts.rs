// LLM prompt templates for answer scoring.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Answer analysis prompt.
/// Replace: {persona}, {job_title}, {question}, {answer}, {json_only}
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"{persona} 다음 면접 질문과 지원자의 답변을 상세히 분석해주세요.

면접 질문: {question}
지원자 답변: {answer}
직무: {job_title}

분석 절차:
1. 이 질문이 평가하려는 의도와 핵심 역량이 무엇인지 먼저 파악하세요.
2. 상황(Situation) - 행동(Action) - 결과(Result) 구조로 이상적인 모범 답변을 작성하세요.
3. 지원자의 답변을 아래 네 가지 기준으로 각각 0-25점 사이에서 평가하세요.
   - understanding (질문 이해도): 질문의 핵심 의도를 정확히 파악하고 답변했는가
   - logic (논리적 구성): 답변이 체계적이고 논리적으로 구성되었는가
   - specificity (구체성): 구체적인 경험, 사례, 수치 등이 포함되었는가
   - relevance (직무 적합성): {job_title} 직무에서 요구하는 역량과 연관성이 있는가

특별 고려사항:
- 답변이 너무 짧거나 "모르겠습니다"와 같은 경우, 질문이 요구하는 지식과 경험을 구체적으로 안내해주세요.
- {job_title} 직무의 실무 관점에서 실용적인 피드백을 제공해주세요.
- strengths와 improvements는 각각 최대 3개까지 작성하세요.

{json_only}

{
  "scores": {
    "understanding": 20,
    "logic": 15,
    "specificity": 10,
    "relevance": 18
  },
  "totalScore": 63,
  "strengths": ["구체적인 예시", "논리적 설명"],
  "improvements": ["경험 추가 필요", "구체적 수치 제시"],
  "feedback": "질문의 핵심을 이해했으나 구체적인 경험 사례가 부족합니다.",
  "idealAnswer": "상황-행동-결과 구조로 작성한 모범 답변",
  "conceptualExplanation": "이 질문이 평가하려는 역량과 핵심 개념에 대한 설명"
}"#;
