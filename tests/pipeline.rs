//! End-to-end pipeline tests through the public API.
//!
//! Exercise the full router → fan-out → join → combiner path with a
//! scripted provider and in-memory retrievers.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use qroute_rs::agent::{
    AgentConfig, ChatRequest, ChatResponse, FailurePolicy, LlmProvider, NO_ANSWER_RESPONSE,
    Orchestrator, TokenUsage,
};
use qroute_rs::error::AgentError;
use qroute_rs::registry::DomainRegistry;
use qroute_rs::retrieval::{Passage, Retriever, RetrieverSet, StaticRetriever};

/// Provider double that selects its reply by substring match against the
/// request's messages and records every request it sees.
struct KeyedProvider {
    replies: Vec<(String, String, Duration)>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl KeyedProvider {
    fn new(entries: &[(&str, &str)]) -> Self {
        Self::with_delays(
            &entries
                .iter()
                .map(|&(k, r)| (k, r, Duration::ZERO))
                .collect::<Vec<_>>(),
        )
    }

    fn with_delays(entries: &[(&str, &str, Duration)]) -> Self {
        Self {
            replies: entries
                .iter()
                .map(|&(k, r, d)| (k.to_string(), r.to_string(), d))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for KeyedProvider {
    fn name(&self) -> &'static str {
        "keyed"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        let text = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let Some((_, reply, delay)) = self.replies.iter().find(|(key, _, _)| text.contains(key))
        else {
            return Err(AgentError::ApiRequest {
                message: "no scripted reply for request".to_string(),
                status: None,
            });
        };

        if !delay.is_zero() {
            tokio::time::sleep(*delay).await;
        }

        Ok(ChatResponse {
            content: reply.clone(),
            usage: TokenUsage {
                prompt_tokens: 20,
                completion_tokens: 10,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }
}

fn retrievers() -> RetrieverSet {
    RetrieverSet::new()
        .with(
            "products",
            Arc::new(StaticRetriever::new(
                "products-index",
                vec![
                    Passage::new("The Pro plan costs 40 per seat per month."),
                    Passage::new("The Starter plan is free for up to three users."),
                ],
            )) as Arc<dyn Retriever>,
        )
        .with(
            "processes",
            Arc::new(StaticRetriever::new(
                "processes-index",
                vec![Passage::new(
                    "Discounts above ten percent require director approval.",
                )],
            )) as Arc<dyn Retriever>,
        )
        .with(
            "hr",
            Arc::new(StaticRetriever::new(
                "hr-index",
                vec![Passage::new(
                    "Vacation policy grants 25 days of paid leave per year.",
                )],
            )) as Arc<dyn Retriever>,
        )
}

fn orchestrator(provider: Arc<KeyedProvider>, config: AgentConfig) -> Orchestrator {
    Orchestrator::new(
        provider as Arc<dyn LlmProvider>,
        Arc::new(DomainRegistry::reference()),
        retrievers(),
        config,
    )
    .unwrap_or_else(|_| unreachable!())
}

fn config() -> AgentConfig {
    AgentConfig::builder()
        .api_key("test")
        .build()
        .unwrap_or_else(|_| unreachable!())
}

#[tokio::test]
async fn vacation_question_routes_to_hr_only() {
    let provider = Arc::new(KeyedProvider::new(&[
        ("routing classifier", r#"{"domains": ["hr"]}"#),
        ("human resources specialist", "Employees get 25 days of paid leave."),
        ("synthesis assistant", "You are entitled to 25 days of paid leave per year."),
    ]));
    let orch = orchestrator(Arc::clone(&provider), config());

    let outcome = orch
        .run("What is the vacation policy?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.routes.iter().collect::<Vec<_>>(), vec!["hr"]);
    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.answers[0].domain, "hr");
    assert!(outcome.final_answer.contains("25 days"));

    // Router + one specialist + combiner; no other specialist ran.
    assert_eq!(provider.calls().len(), 3);
}

#[tokio::test]
async fn two_domain_question_reaches_combiner_with_both_answers() {
    let provider = Arc::new(KeyedProvider::with_delays(&[
        (
            "routing classifier",
            r#"{"domains": ["products", "processes"]}"#,
            Duration::ZERO,
        ),
        // The first-routed specialist is the slower one.
        (
            "product knowledge specialist",
            "The Pro plan costs 40 per seat.",
            Duration::from_millis(60),
        ),
        (
            "internal process specialist",
            "Discounts over ten percent need director approval.",
            Duration::from_millis(5),
        ),
        (
            "synthesis assistant",
            "The Pro plan costs 40 per seat; discounts over ten percent need director approval.",
            Duration::ZERO,
        ),
    ]));
    let orch = orchestrator(Arc::clone(&provider), config());

    let outcome = orch
        .run("What does the Pro plan cost and who approves a 15 percent discount?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.routes.len(), 2);
    assert_eq!(outcome.answers.len(), 2);

    // The combiner's input must contain both specialist answers even
    // though they completed out of order.
    let calls = provider.calls();
    let combiner_input = calls
        .iter()
        .find(|c| c.messages[0].content.contains("synthesis assistant"))
        .map(|c| c.messages[1].content.clone())
        .unwrap_or_default();
    assert!(combiner_input.contains("40 per seat"));
    assert!(combiner_input.contains("director approval"));
}

#[tokio::test]
async fn unmatched_question_yields_not_found_without_specialists() {
    let provider = Arc::new(KeyedProvider::new(&[(
        "routing classifier",
        r#"{"domains": []}"#,
    )]));
    let orch = orchestrator(Arc::clone(&provider), config());

    let outcome = orch
        .run("What will the weather be tomorrow?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert!(outcome.routes.is_empty());
    assert!(outcome.answers.is_empty());
    assert_eq!(outcome.final_answer, NO_ANSWER_RESPONSE);
    // Only the router ran.
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn malformed_classification_never_escapes_the_router() {
    let provider = Arc::new(KeyedProvider::new(&[(
        "routing classifier",
        "probably HR related, hard to say",
    )]));
    let orch = orchestrator(provider, config());

    let outcome = orch
        .run("What is the vacation policy?")
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(outcome.routes.is_empty());
    assert_eq!(outcome.final_answer, NO_ANSWER_RESPONSE);
}

#[tokio::test]
async fn deterministic_stubs_give_identical_outcomes() {
    let entries: &[(&str, &str)] = &[
        ("routing classifier", r#"{"domains": ["hr"]}"#),
        ("human resources specialist", "25 days of paid leave."),
        ("synthesis assistant", "You get 25 days of paid leave."),
    ];

    let first = orchestrator(Arc::new(KeyedProvider::new(entries)), config())
        .run("What is the vacation policy?")
        .await
        .unwrap_or_else(|_| unreachable!());
    let second = orchestrator(Arc::new(KeyedProvider::new(entries)), config())
        .run("What is the vacation policy?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(first.routes, second.routes);
    assert_eq!(first.final_answer, second.final_answer);
}

#[tokio::test]
async fn best_effort_returns_partial_result() {
    // No scripted reply for the HR specialist, so its call fails.
    let provider = Arc::new(KeyedProvider::new(&[
        ("routing classifier", r#"{"domains": ["hr", "products"]}"#),
        ("product knowledge specialist", "The Pro plan costs 40 per seat."),
        ("synthesis assistant", "The Pro plan costs 40 per seat."),
    ]));
    let cfg = AgentConfig::builder()
        .api_key("test")
        .failure_policy(FailurePolicy::BestEffort)
        .build()
        .unwrap_or_else(|_| unreachable!());
    let orch = orchestrator(provider, cfg);

    let outcome = orch
        .run("vacation policy and Pro plan pricing?")
        .await
        .unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome.answers.len(), 1);
    assert_eq!(outcome.specialists_failed, 1);
    assert!(outcome.final_answer.contains("40 per seat"));
}
