//! Keyword rules engine for free-chat queries.
//!
//! A fixed, ordered decision table: each rule is a pattern over the
//! lowercased query, first match wins. With no match, the response falls
//! back to guidance keyed off the stored repayment rate, or to a generic
//! referral when no result exists yet. Identical `(query, result)` inputs
//! always produce the identical response; transcript appension is the
//! caller's responsibility.

use regex::Regex;
use tracing::debug;

use crate::summary::SurveyResult;

/// A single canned-response rule.
pub struct CannedRule {
    /// Short topic name, for logging.
    pub topic: &'static str,
    regex: Regex,
    response: &'static str,
}

/// The ordered rule table.
pub struct ChatRules {
    rules: Vec<CannedRule>,
}

const DOCUMENTS: &str = "기본 필요 서류\n\n\
    • 신분증 사본\n\
    • 주민등록등본\n\
    • 소득증빙서류 (급여명세서/소득금액증명원)\n\
    • 부채증명서 (금융기관별)\n\n\
    아크로 서비스 포함사항: 부채증명서 발급대행을 무료로 해드립니다.";

const REFUND: &str = "기각시 100% 환불 보장\n\n\
    저희 아크로는 AI 정밀 분석을 통해 기각 확률을 최소화합니다.\n\n\
    만약 저희 과실로 기각될 경우 전액 환불해 드립니다. (단, 채무자 귀책사유 제외)";

const GAMBLING: &str = "도박/투자 빚도 가능합니다!\n\n\
    서울회생법원 실무준칙(제32조)에 따르면:\n\
    • 도박/투자 손실금은 청산가치에서 제외되는 경우가 많습니다\n\
    • 단, 반성문과 갱생계획이 필요합니다\n\n\
    저희 전문가들이 법원 설득 논리를 만들어 드립니다.";

const COST: &str = "아크로 올인원 패키지: 190만원\n\n\
    포함 항목:\n\
    • 모든 서류 작성/접수\n\
    • 무제한 보정명령 대응 (추가비용 0원)\n\
    • AI 맞춤 진술서 작성\n\
    • 10개월 무이자 분납 가능\n\n\
    타 사무소 '150만원~' 광고 주의! 보정명령 1회당 30만원 추가됩니다.";

const DURATION: &str = "회생 진행 기간\n\n\
    • 서류 준비: 약 1-2주\n\
    • 법원 접수 후 개시결정: 1-2개월\n\
    • 인가결정: 접수 후 4-6개월\n\
    • 변제기간: 36개월 (3년)\n\n\
    총 약 4년 정도 소요됩니다.";

const CREDIT: &str = "회생과 신용등급\n\n\
    • 회생 신청시 신용등급이 낮아집니다\n\
    • 하지만 이미 연체가 있다면 큰 차이 없습니다\n\
    • 인가결정 후 5년 지나면 기록 삭제\n\
    • 변제 완료 후 신용회복 가능";

const REFERRAL: &str = "문의주셔서 감사합니다.\n\n\
    더 정확한 상담을 위해 텔레그램이나 전화상담을 이용해주세요.\n\
    담당 변호사가 직접 답변드리겠습니다!";

const RATE_LOW: &str =
    "변제율이 낮아 회생 가능성이 높습니다. 자세한 상담을 통해 최적의 방안을 찾아드리겠습니다.";
const RATE_MID: &str =
    "적정한 변제율입니다. 법원 인가 가능성이 높으며, 추가 최적화 여지도 있습니다.";
const RATE_HIGH: &str =
    "변제율이 다소 높지만, 재산/소득 구성에 따라 조정 가능합니다. 자세한 상담을 권장드립니다.";

impl ChatRules {
    /// The default rule table. Order matters: the cost rule's bare "얼마"
    /// keyword also covers "얼마나 걸..." duration phrasings, so the
    /// duration rule is only reachable via "기간".
    pub fn default_rules() -> Self {
        let rule = |topic, pattern, response| CannedRule {
            topic,
            // The patterns are fixed literals/alternations; compilation
            // cannot fail.
            regex: Regex::new(pattern).expect("invalid canned-rule pattern"),
            response,
        };
        Self {
            rules: vec![
                rule("documents", "서류", DOCUMENTS),
                rule("refund", "환불|기각", REFUND),
                rule("gambling", "도박|주식|코인", GAMBLING),
                rule("cost", "비용|가격|얼마", COST),
                rule("duration", "기간|얼마나 걸", DURATION),
                rule("credit", "신용|등급", CREDIT),
            ],
        }
    }

    /// Answer a free-text query. Pure and total.
    pub fn respond(&self, query: &str, result: Option<&SurveyResult>) -> String {
        let lowered = query.to_lowercase();
        for rule in &self.rules {
            if rule.regex.is_match(&lowered) {
                debug!(topic = rule.topic, "free-chat query matched canned rule");
                return rule.response.to_string();
            }
        }
        match result {
            Some(result) => rate_fallback(result),
            None => REFERRAL.to_string(),
        }
    }
}

impl Default for ChatRules {
    fn default() -> Self {
        Self::default_rules()
    }
}

fn rate_fallback(result: &SurveyResult) -> String {
    let rate = result.repayment_rate;
    let guidance = if rate < 20.0 {
        RATE_LOW
    } else if rate < 50.0 {
        RATE_MID
    } else {
        RATE_HIGH
    };
    format!(
        "고객님의 예상 변제율 {rate:.1}%를 기준으로 말씀드리면,\n\n{guidance}\n\n더 궁금하신 점이 있으시면 물어봐주세요!"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_rate(rate: f64) -> SurveyResult {
        SurveyResult {
            repayment_rate: rate,
            monthly_repayment_total: 500_000,
            total_repayment: 18_000_000,
            total_debt: 50_000_000,
            secured_debt: 0,
            unsecured_debt: 50_000_000,
            monthly_income: 3_000_000,
            living_expenses: 1_500_000,
            monthly_available: 500_000,
        }
    }

    #[test]
    fn documents_keyword() {
        let rules = ChatRules::default_rules();
        let response = rules.respond("필요 서류가 뭔가요?", None);
        assert!(response.contains("기본 필요 서류"));
    }

    #[test]
    fn refund_and_dismissal_share_a_rule() {
        let rules = ChatRules::default_rules();
        assert!(rules.respond("환불 되나요?", None).contains("100% 환불"));
        assert!(rules.respond("기각되면 어떡하죠", None).contains("100% 환불"));
    }

    #[test]
    fn gambling_investment_keywords() {
        let rules = ChatRules::default_rules();
        for query in ["도박 빚도 되나요?", "주식 손실이 있어요", "코인 투자 실패"] {
            assert!(rules.respond(query, None).contains("도박/투자 빚도 가능합니다"));
        }
    }

    #[test]
    fn cost_keyword_wins_regardless_of_result() {
        let rules = ChatRules::default_rules();
        let result = result_with_rate(65.0);
        let response = rules.respond("비용이 얼마인가요?", Some(&result));
        assert!(response.contains("190만원"));
    }

    #[test]
    fn bare_eolma_resolves_to_cost_before_duration() {
        // "얼마나 걸리나요" contains the cost rule's "얼마" keyword, and the
        // cost rule is checked first. Pinned: the rule order is part of
        // the decision table's contract.
        let rules = ChatRules::default_rules();
        assert!(rules.respond("얼마나 걸리나요?", None).contains("190만원"));
        assert!(rules.respond("기간은 어떻게 되나요", None).contains("회생 진행 기간"));
    }

    #[test]
    fn credit_keyword() {
        let rules = ChatRules::default_rules();
        assert!(rules.respond("신용등급 떨어지나요", None).contains("회생과 신용등급"));
    }

    #[test]
    fn fallback_uses_rate_bands() {
        let rules = ChatRules::default_rules();
        let low = rules.respond("다른 질문이요", Some(&result_with_rate(15.0)));
        assert!(low.contains("15.0%"));
        assert!(low.contains("회생 가능성이 높습니다"));

        let mid = rules.respond("다른 질문이요", Some(&result_with_rate(35.0)));
        assert!(mid.contains("적정한 변제율"));

        let high = rules.respond("다른 질문이요", Some(&result_with_rate(65.0)));
        assert!(high.contains("다소 높지만"));
    }

    #[test]
    fn band_boundaries_are_disjoint() {
        let rules = ChatRules::default_rules();
        assert!(rules
            .respond("궁금해요", Some(&result_with_rate(20.0)))
            .contains("적정한 변제율"));
        assert!(rules
            .respond("궁금해요", Some(&result_with_rate(50.0)))
            .contains("다소 높지만"));
    }

    #[test]
    fn no_match_without_result_refers_out() {
        let rules = ChatRules::default_rules();
        assert!(rules.respond("안녕하세요", None).contains("문의주셔서 감사합니다"));
    }

    #[test]
    fn identical_inputs_produce_identical_responses() {
        let rules = ChatRules::default_rules();
        let result = result_with_rate(42.0);
        let a = rules.respond("뭔가 궁금한데요", Some(&result));
        let b = rules.respond("뭔가 궁금한데요", Some(&result));
        assert_eq!(a, b);
    }

    #[test]
    fn keyword_match_is_case_insensitive_for_latin() {
        let rules = ChatRules::default_rules();
        // Queries are lowercased before matching; Korean is unaffected.
        let response = rules.respond("FEE? 비용?", None);
        assert!(response.contains("190만원"));
    }
}
