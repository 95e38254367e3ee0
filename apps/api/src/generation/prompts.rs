// Prompt builders for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::generation::generator::GenerationTask;
use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, PLATFORM_BEST_PRACTICES};
use crate::models::context::ContentContext;
use crate::models::guideline::Platform;

const CAPTION_SCHEMA: &str = r#"{
  "content": "The generated social media post",
  "understanding": "How you understood the request",
  "reasoning": "Why you chose this approach",
  "improvements": ["suggestion1", "suggestion2"]
}"#;

const HASHTAG_SCHEMA: &str = r#"{
  "hashtags": ["tag1", "tag2", "tag3"],
  "understanding": "How you understood the request",
  "reasoning": "Why you chose these hashtags",
  "improvements": ["suggestion1", "suggestion2"]
}"#;

fn task_instruction(task: GenerationTask) -> &'static str {
    match task {
        GenerationTask::Caption => "Generate an engaging caption based on the provided prompt.",
        GenerationTask::Hashtags => {
            "Generate relevant, trending hashtags that will maximize reach and engagement."
        }
        GenerationTask::Optimize => {
            "Optimize the provided content for maximum engagement while maintaining the core message."
        }
    }
}

fn brand_section(context: &ContentContext) -> String {
    let guideline = &context.guidelines.fields;
    let previous: Vec<&str> = context
        .previous_content
        .iter()
        .map(|item| item.content.as_str())
        .collect();
    let engagement = serde_json::to_string(&context.performance.engagement).unwrap_or_default();

    format!(
        "Use these brand guidelines:\n\
         Voice: {}\n\
         Tone: {}\n\
         Style: {}\n\
         Keywords: {}\n\
         Emojis: {}\n\n\
         Historical Context:\n\
         - Previous successful posts:\n{}\n\
         - Overall engagement level: {}\n\
         - Most effective elements: {}",
        guideline.voice,
        guideline.tone,
        guideline.style,
        guideline.keywords.join(", "),
        if guideline.use_emojis { "allowed" } else { "avoid" },
        previous.join("\n"),
        context.performance.sentiment.as_str(),
        engagement,
    )
}

pub fn generation_system(
    task: GenerationTask,
    platform: Platform,
    context: Option<&ContentContext>,
) -> String {
    let schema = match task {
        GenerationTask::Hashtags => HASHTAG_SCHEMA,
        GenerationTask::Caption | GenerationTask::Optimize => CAPTION_SCHEMA,
    };
    let brand = context.map(brand_section).unwrap_or_default();

    format!(
        "You are a social media content creator specializing in {platform}.\n\
         Please provide your response in JSON format with the following structure:\n\
         {schema}\n\n\
         {brand}\n\n\
         {PLATFORM_BEST_PRACTICES}\n\n\
         {instruction}\n\
         {JSON_ONLY_INSTRUCTION}",
        platform = platform.as_str(),
        instruction = task_instruction(task),
    )
}

pub fn generation_user_prompt(
    task: GenerationTask,
    platform: Platform,
    objective: &str,
    content: &str,
) -> String {
    let platform = platform.as_str();
    match task {
        GenerationTask::Optimize => format!("Optimize this content for {platform}: {content}"),
        GenerationTask::Hashtags => {
            format!("Suggest hashtags for this content on {platform}: {content}")
        }
        GenerationTask::Caption => format!(
            "Create a {platform} post with objective: {objective}. Return the response in JSON format."
        ),
    }
}

pub fn tone_analysis_system(context: &ContentContext) -> String {
    format!(
        "Analyze this social media content and provide your response in JSON format:\n\
         {{\n  \"brandAlignment\": 0.95,\n  \"engagement\": 0.85,\n  \"sentiment\": \"positive\"\n}}\n\n\
         Context:\n\
         Brand voice: {}\n\
         Brand tone: {}\n\
         Previous content sentiment: {}\n\
         Brand effectiveness: {}\n\n\
         Analyze and score:\n\
         - Brand alignment (0-1)\n\
         - Predicted engagement (0-1)\n\
         - Overall sentiment prediction\n\
         {JSON_ONLY_INSTRUCTION}",
        context.guidelines.fields.voice,
        context.guidelines.fields.tone,
        context.performance.sentiment.as_str(),
        context.performance.effectiveness,
    )
}

pub fn tone_analysis_user_prompt(content: &str) -> String {
    format!("Analyze this content and return JSON response: {content}")
}
