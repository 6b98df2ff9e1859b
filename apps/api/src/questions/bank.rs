//! Built-in Korean question bank, served whenever remote generation is unavailable.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::interview::Difficulty::{Easy, Hard, Medium};
use crate::models::interview::{Difficulty, InterviewQuestion, JobCategory};

type Entry = (Difficulty, &'static str);

const FRONTEND: &[Entry] = &[
    (Easy, "React에서 상태(state)와 props의 차이를 설명해주세요."),
    (Easy, "반응형 웹을 구현할 때 주로 사용하는 방법은 무엇인가요?"),
    (Medium, "브라우저 렌더링 과정과 이를 고려한 성능 최적화 경험을 말씀해주세요."),
    (Medium, "컴포넌트를 재사용 가능하게 설계할 때 어떤 기준을 세우시나요?"),
    (Medium, "전역 상태 관리 라이브러리를 선택했던 기준과 그 결과를 설명해주세요."),
    (Medium, "웹 접근성을 개선하기 위해 적용해 본 방법이 있다면 소개해주세요."),
    (Hard, "대규모 SPA의 초기 로딩 속도를 개선했던 경험을 수치와 함께 설명해주세요."),
    (Hard, "서버 사이드 렌더링과 클라이언트 렌더링을 혼합할 때의 트레이드오프는 무엇인가요?"),
];

const BACKEND: &[Entry] = &[
    (Easy, "REST API를 설계할 때 지키는 원칙을 설명해주세요."),
    (Easy, "관계형 데이터베이스와 NoSQL을 선택하는 기준은 무엇인가요?"),
    (Medium, "트랜잭션 격리 수준과 실제로 겪었던 동시성 문제를 말씀해주세요."),
    (Medium, "API 응답 속도를 개선하기 위해 캐시를 도입했던 경험을 설명해주세요."),
    (Medium, "인증과 인가를 구현할 때 고려한 보안 요소는 무엇인가요?"),
    (Medium, "장애가 발생했을 때 원인을 추적하고 해결했던 과정을 설명해주세요."),
    (Hard, "트래픽이 10배로 늘어난다면 현재 아키텍처에서 무엇을 먼저 바꾸시겠습니까?"),
    (Hard, "분산 환경에서 데이터 정합성을 보장하기 위해 사용한 전략을 설명해주세요."),
];

const PLANNER: &[Entry] = &[
    (Easy, "서비스 기획자로서 가장 중요하다고 생각하는 역량은 무엇인가요?"),
    (Easy, "요구사항을 정리할 때 사용하는 문서나 도구를 소개해주세요."),
    (Medium, "이해관계자 간 요구사항이 충돌했을 때 어떻게 조율하셨나요?"),
    (Medium, "사용자 데이터를 근거로 기능을 개선했던 경험을 말씀해주세요."),
    (Medium, "기획한 기능의 성공 여부를 어떤 지표로 판단하셨나요?"),
    (Hard, "한정된 일정 안에서 기능 우선순위를 정했던 과정을 구체적으로 설명해주세요."),
    (Hard, "출시 후 기대와 다른 결과가 나왔던 기획을 어떻게 수습하셨나요?"),
];

const DESIGNER: &[Entry] = &[
    (Easy, "본인의 디자인 프로세스를 단계별로 설명해주세요."),
    (Easy, "좋은 사용자 경험이란 무엇이라고 생각하시나요?"),
    (Medium, "디자인 시스템을 구축하거나 개선했던 경험을 말씀해주세요."),
    (Medium, "개발자와 협업할 때 디자인 의도를 전달하는 방법은 무엇인가요?"),
    (Medium, "사용성 테스트 결과를 디자인에 반영했던 사례를 설명해주세요."),
    (Hard, "브랜드 가이드와 사용성이 충돌할 때 어떤 기준으로 결정하셨나요?"),
    (Hard, "디자인 개선의 성과를 정량적으로 증명했던 경험을 설명해주세요."),
];

const MARKETER: &[Entry] = &[
    (Easy, "최근 인상 깊었던 마케팅 캠페인과 그 이유를 말씀해주세요."),
    (Easy, "타겟 고객을 정의할 때 어떤 정보를 활용하시나요?"),
    (Medium, "캠페인 성과를 측정하기 위해 설정했던 지표와 결과를 설명해주세요."),
    (Medium, "제한된 예산으로 최대의 성과를 냈던 경험을 말씀해주세요."),
    (Medium, "A/B 테스트를 설계하고 결과를 해석했던 사례를 설명해주세요."),
    (Hard, "브랜드 인지도와 단기 전환율 사이의 균형을 어떻게 잡으셨나요?"),
    (Hard, "실패한 캠페인에서 얻은 교훈과 이후 전략의 변화를 설명해주세요."),
];

const GENERIC: &[Entry] = &[
    (Easy, "간단하게 자기소개를 해주세요."),
    (Easy, "이 직무에 지원하게 된 동기는 무엇인가요?"),
    (Easy, "본인의 강점과 약점을 한 가지씩 말씀해주세요."),
    (Medium, "팀 프로젝트에서 갈등을 해결했던 경험을 말씀해주세요."),
    (Medium, "가장 도전적이었던 목표와 이를 달성한 과정을 설명해주세요."),
    (Medium, "업무 우선순위를 정하는 본인만의 방법이 있나요?"),
    (Medium, "실패를 통해 배운 점이 있다면 구체적으로 말씀해주세요."),
    (Hard, "본인의 성과를 수치로 증명할 수 있는 경험을 설명해주세요."),
    (Hard, "5년 후 이 분야에서 어떤 전문가가 되어 있을지 구체적으로 말씀해주세요."),
];

fn entries(category: JobCategory) -> &'static [Entry] {
    match category {
        JobCategory::Frontend => FRONTEND,
        JobCategory::Backend => BACKEND,
        JobCategory::Planner => PLANNER,
        JobCategory::Designer => DESIGNER,
        JobCategory::Marketer => MARKETER,
        _ => GENERIC,
    }
}

/// Every bank question for a category, in bank order. Ids are stable per entry.
pub fn questions_for(category: JobCategory) -> Vec<InterviewQuestion> {
    entries(category)
        .iter()
        .enumerate()
        .map(|(i, (difficulty, question))| InterviewQuestion {
            id: format!("bank-{}-{}", category.as_str(), i + 1),
            category,
            question: question.to_string(),
            difficulty: *difficulty,
        })
        .collect()
}

/// Up to `n` bank questions in an order drawn from `rng`.
pub fn draw<R: Rng + ?Sized>(category: JobCategory, n: usize, rng: &mut R) -> Vec<InterviewQuestion> {
    let mut questions = questions_for(category);
    questions.shuffle(rng);
    questions.truncate(n);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_every_category_has_questions() {
        for category in JobCategory::ALL {
            let questions = questions_for(category);
            assert!(!questions.is_empty(), "{category} has no questions");
            assert!(questions.iter().all(|q| q.category == category));
        }
    }

    #[test]
    fn test_ids_are_unique_within_category() {
        let questions = questions_for(JobCategory::Backend);
        let ids: HashSet<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), questions.len());
        assert_eq!(questions[0].id, "bank-backend-1");
    }

    #[test]
    fn test_draw_is_reproducible_with_seed() {
        let a = draw(JobCategory::Frontend, 5, &mut StdRng::seed_from_u64(42));
        let b = draw(JobCategory::Frontend, 5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_draw_caps_at_bank_size() {
        let all = questions_for(JobCategory::Planner).len();
        let drawn = draw(JobCategory::Planner, 100, &mut StdRng::seed_from_u64(1));
        assert_eq!(drawn.len(), all);
    }
}
