//! Where assistant replies come from.
//!
//! Replies are produced whole and then revealed word by word; nothing here streams.

use parley_protocol::SubmissionPayload;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub trait ResponseSource {
    fn generate_response(&mut self, payload: &SubmissionPayload) -> anyhow::Result<String>;
}

const SAMPLE_RESPONSES: [&str; 3] = [
    "# Hello! I'm here to help 🚀

I can assist you with a variety of tasks:

- **Writing code** in multiple languages
- **Answering questions** about various topics
- **Creative writing** and brainstorming
- **Data analysis** and problem-solving

## Here's a quick example:

```python
def greet(name):
    return f\"Hello, {name}! Welcome to our chat!\"

print(greet(\"User\"))
```

Feel free to ask me anything!",
    "That's an interesting question! Let me break it down for you:

1. **First point**: This is important because...
2. **Second point**: Consider the following...
3. **Third point**: Additionally, we should note...

> \"The best way to predict the future is to invent it.\" - Alan Kay

Would you like me to elaborate on any of these points?",
    "Here's a simple implementation:

```javascript
function calculateSum(numbers) {
  return numbers.reduce((acc, num) => acc + num, 0);
}

// Example usage
const result = calculateSum([1, 2, 3, 4, 5]);
console.log(result); // Output: 15
```

This function uses the `reduce` method to sum all numbers in an array. It's efficient and clean!",
];

/// Picks one of a fixed set of replies at random, ignoring the prompt.
pub struct CannedResponses {
    responses: Vec<String>,
    rng: StdRng,
}

impl CannedResponses {
    pub fn new(responses: Vec<String>, rng: StdRng) -> Self {
        Self { responses, rng }
    }

    pub fn sample() -> Self {
        Self::new(
            SAMPLE_RESPONSES.iter().map(|s| (*s).to_string()).collect(),
            StdRng::from_os_rng(),
        )
    }
}

impl ResponseSource for CannedResponses {
    fn generate_response(&mut self, _payload: &SubmissionPayload) -> anyhow::Result<String> {
        if self.responses.is_empty() {
            anyhow::bail!("no canned responses configured");
        }
        let idx = self.rng.random_range(0..self.responses.len());
        Ok(self.responses[idx].clone())
    }
}

/// Acknowledges the prompt by quoting it back.
#[derive(Debug, Default)]
pub struct EchoResponse;

impl ResponseSource for EchoResponse {
    fn generate_response(&mut self, payload: &SubmissionPayload) -> anyhow::Result<String> {
        Ok(format!(
            "I understand you're asking about \"{}\". Let me help you with that...",
            payload.text
        ))
    }
}
