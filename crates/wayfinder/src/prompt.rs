// Instruction template, split around the recommended activity and the user input
const TEMPLATE_HEAD: &str = "
You are a bot that makes recommendations for activities.
You answer in very short sentences and do not include extra information.

This is the recommended activity:
";

const TEMPLATE_MIDDLE: &str = "

The user input is:
";

const TEMPLATE_TAIL: &str = "

Compile a recommendation to the user ased on the recommended activity and the user input.
";

/// Embed both inputs verbatim into the instruction template
pub fn build(recommended: &str, user_input: &str) -> String {
  let mut prompt = String::with_capacity(
    TEMPLATE_HEAD.len()
      + recommended.len()
      + TEMPLATE_MIDDLE.len()
      + user_input.len()
      + TEMPLATE_TAIL.len(),
  );
  prompt.push_str(TEMPLATE_HEAD);
  prompt.push_str(recommended);
  prompt.push_str(TEMPLATE_MIDDLE);
  prompt.push_str(user_input);
  prompt.push_str(TEMPLATE_TAIL);
  prompt
}
