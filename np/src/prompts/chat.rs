//! ChatML prompt formatting for endpoints that take one raw prompt string

/// Build a ChatML prompt from a system instruction, prior turns and the new query
///
/// Each history entry is a (user, assistant) pair. The result ends with an
/// open assistant turn for the model to complete.
pub fn format_chatml(meta_instruction: &str, history: &[(String, String)], query: &str) -> String {
    let mut prompt = format!("<|im_start|>system\n{}<|im_end|>", meta_instruction);
    for (user, assistant) in history {
        prompt.push_str(&format!(
            "\n<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n{}<|im_end|>",
            user, assistant
        ));
    }
    prompt.push_str(&format!("\n<|im_start|>user\n{}<|im_end|>\n<|im_start|>assistant\n", query));
    prompt
}
