// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments used by more than one of them.

/// Appended to every prompt that expects a single JSON value back.
pub const JSON_ONLY_INSTRUCTION: &str =
    "**중요: 오직 지정된 JSON 형식으로만 응답하세요. 추가 설명이나 텍스트, 마크다운 코드 블록은 포함하지 마세요.**";

/// Persona line shared by all interviewer prompts. Replace `{job_title}`.
pub const INTERVIEWER_PERSONA: &str = "당신은 {job_title} 분야의 전문 면접관입니다.";

pub fn interviewer_persona(job_title: &str) -> String {
    fill_template(INTERVIEWER_PERSONA, &[("job_title", job_title)])
}

/// Substitutes `{name}` placeholders in one left-to-right pass. Substituted text is never
/// rescanned, so user input containing `{category}` and the like stays literal. Braces
/// that do not name a known placeholder (JSON examples in the templates) are kept.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after_brace = &rest[start + 1..];
        let hit = values.iter().find_map(|(name, value)| {
            let tail = after_brace.strip_prefix(name)?.strip_prefix('}')?;
            Some((*value, tail))
        });
        match hit {
            Some((value, tail)) => {
                out.push_str(value);
                rest = tail;
            }
            None => {
                out.push('{');
                rest = after_brace;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_keeps_unknown_braces() {
        let filled = fill_template(r#"{a} {"k": "{b}"} {c}"#, &[("a", "1"), ("b", "2")]);
        assert_eq!(filled, r#"1 {"k": "2"} {c}"#);
    }

    #[test]
    fn test_fill_template_does_not_rescan_values() {
        let filled = fill_template("{answer} / {category}", &[
            ("answer", "{category}"),
            ("category", "backend"),
        ]);
        assert_eq!(filled, "{category} / backend");
    }
}
