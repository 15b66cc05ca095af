use super::*;
use crate::llm::types::ImageData;
use serde_json::json;

fn chat_request<'a>(persona: &'a str, prompt: &'a str, image: Option<ImageData>) -> ChatRequest<'a> {
    ChatRequest { persona, user_prompt: prompt, image }
}

fn png() -> ImageData {
    ImageData::from_data_uri("data:image/png;base64,iVBORw0KGgo").unwrap()
}

// ===== request shaping =====

#[test]
fn text_request_has_system_then_user() {
    let req = chat_request("You are an analyst.", "Analyze EURUSD", None);
    let body = serde_json::to_value(build_request("gpt-4o", &req, true)).unwrap();
    assert_eq!(
        body,
        json!({
            "model": "gpt-4o",
            "messages": [
                { "role": "system", "content": "You are an analyst." },
                { "role": "user", "content": "Analyze EURUSD" }
            ]
        })
    );
}

#[test]
fn blank_persona_omits_system_message() {
    let req = chat_request("  ", "hello", None);
    let body = serde_json::to_value(build_request("gpt-4o", &req, false)).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
}

#[test]
fn image_becomes_image_url_part_when_accepted() {
    let req = chat_request("p", "look at this", Some(png()));
    let body = serde_json::to_value(build_request("gpt-4o", &req, true)).unwrap();
    let content = &body["messages"][1]["content"];
    assert_eq!(content[0], json!({ "type": "text", "text": "look at this" }));
    assert_eq!(content[1]["type"], "image_url");
    assert_eq!(content[1]["image_url"]["url"], "data:image/png;base64,iVBORw0KGgo");
}

#[test]
fn image_is_dropped_for_text_only_vendors() {
    let req = chat_request("p", "look at this", Some(png()));
    let body = serde_json::to_value(build_request("llama3.1-70b", &req, false)).unwrap();
    assert_eq!(body["messages"][1]["content"], "look at this");
}

// ===== response parsing =====

#[test]
fn parse_text_response() {
    let json = json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"recommendation\":\"BUY\"}" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let text = parse_response(Provider::OpenAi, &json).unwrap();
    assert_eq!(text, "{\"recommendation\":\"BUY\"}");
}

#[test]
fn parse_missing_choices_is_malformed() {
    let json = json!({ "model": "gpt-4o", "choices": [] }).to_string();
    let err = parse_response(Provider::OpenRouter, &json).unwrap_err();
    assert!(
        matches!(err, LlmError::MalformedResponse { provider: Provider::OpenRouter, ref detail } if detail.contains("choices[0]"))
    );
}

#[test]
fn parse_null_content_is_malformed() {
    let json = json!({ "choices": [{ "message": { "role": "assistant", "content": null } }] }).to_string();
    assert!(matches!(parse_response(Provider::OpenAi, &json), Err(LlmError::MalformedResponse { .. })));
}

#[test]
fn parse_empty_content_is_malformed() {
    let json = json!({ "choices": [{ "message": { "content": "   " } }] }).to_string();
    let err = parse_response(Provider::DeepSeek, &json).unwrap_err();
    assert!(matches!(err, LlmError::MalformedResponse { ref detail, .. } if detail.contains("empty")));
}

#[test]
fn parse_invalid_json_is_malformed() {
    assert!(matches!(parse_response(Provider::Llama, "<html>"), Err(LlmError::MalformedResponse { .. })));
}
