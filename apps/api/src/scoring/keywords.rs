//! Per-category vocabulary: domain keywords for lexical matching and Korean job titles
//! used in prompts and templated feedback.

use crate::models::interview::JobCategory;

const FRONTEND: &[&str] = &[
    "React", "JavaScript", "CSS", "HTML", "UI", "UX", "컴포넌트", "반응형", "브라우저", "사용자",
];
const BACKEND: &[&str] = &[
    "API", "데이터베이스", "서버", "성능", "보안", "확장성", "아키텍처", "최적화",
];
const PLANNER: &[&str] = &[
    "기획", "요구사항", "분석", "사용자", "프로세스", "개선", "전략", "목표",
];
const DESIGNER: &[&str] = &[
    "디자인", "사용자", "경험", "인터페이스", "브랜드", "시각적", "레이아웃", "색상",
];
const MARKETER: &[&str] = &[
    "마케팅", "고객", "브랜드", "캠페인", "분석", "성과", "타겟", "전략",
];
const DATA_SCIENCE: &[&str] = &[
    "데이터", "모델", "분석", "통계", "Python", "SQL", "머신러닝", "지표",
];
const DEVOPS: &[&str] = &[
    "CI/CD", "배포", "인프라", "모니터링", "Docker", "Kubernetes", "자동화", "클라우드",
];
const PRODUCT_MANAGEMENT: &[&str] = &[
    "제품", "로드맵", "사용자", "지표", "우선순위", "요구사항", "출시", "가설",
];
const QA: &[&str] = &[
    "테스트", "품질", "버그", "자동화", "시나리오", "회귀", "검증", "결함",
];
const MOBILE_DEVELOPMENT: &[&str] = &[
    "iOS", "Android", "앱", "Swift", "Kotlin", "성능", "배포", "사용자",
];
const GENERIC: &[&str] = &["경험", "역량", "성과", "목표"];

/// Keyword list for a category. `Other` uses the custom category name when one was given.
pub fn job_keywords(category: JobCategory, custom_category: Option<&str>) -> Vec<String> {
    let list: &[&str] = match category {
        JobCategory::Frontend => FRONTEND,
        JobCategory::Backend => BACKEND,
        JobCategory::Planner => PLANNER,
        JobCategory::Designer => DESIGNER,
        JobCategory::Marketer => MARKETER,
        JobCategory::DataScience => DATA_SCIENCE,
        JobCategory::Devops => DEVOPS,
        JobCategory::ProductManagement => PRODUCT_MANAGEMENT,
        JobCategory::Qa => QA,
        JobCategory::MobileDevelopment => MOBILE_DEVELOPMENT,
        JobCategory::Other => match custom_category.map(str::trim).filter(|c| !c.is_empty()) {
            Some(custom) => return vec![custom.to_string()],
            None => GENERIC,
        },
    };
    list.iter().map(|k| k.to_string()).collect()
}

/// Korean job title. `Other` resolves to the custom category, or "일반".
pub fn job_title(category: JobCategory, custom_category: Option<&str>) -> String {
    let title = match category {
        JobCategory::Frontend => "프론트엔드 개발자",
        JobCategory::Backend => "백엔드 개발자",
        JobCategory::Planner => "서비스 기획자",
        JobCategory::Designer => "UI/UX 디자이너",
        JobCategory::Marketer => "마케터",
        JobCategory::DataScience => "데이터 사이언티스트",
        JobCategory::Devops => "DevOps 엔지니어",
        JobCategory::ProductManagement => "프로덕트 매니저",
        JobCategory::Qa => "QA 엔지니어",
        JobCategory::MobileDevelopment => "모바일 개발자",
        JobCategory::Other => {
            return custom_category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("일반")
                .to_string()
        }
    };
    title.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_uses_custom_category_as_only_keyword() {
        assert_eq!(
            job_keywords(JobCategory::Other, Some("데이터 엔지니어")),
            vec!["데이터 엔지니어".to_string()]
        );
    }

    #[test]
    fn test_other_without_custom_uses_generic_list() {
        assert_eq!(job_keywords(JobCategory::Other, None).len(), GENERIC.len());
        assert_eq!(job_keywords(JobCategory::Other, Some("  ")).len(), GENERIC.len());
    }

    #[test]
    fn test_every_category_has_keywords_and_title() {
        for category in JobCategory::ALL {
            assert!(!job_keywords(category, None).is_empty(), "{category}");
            assert!(!job_title(category, None).is_empty(), "{category}");
        }
    }

    #[test]
    fn test_job_title_for_other() {
        assert_eq!(job_title(JobCategory::Other, Some("바리스타")), "바리스타");
        assert_eq!(job_title(JobCategory::Other, None), "일반");
    }
}
