//! Token 用量与费用估算

use phf::phf_map;

/// 每 1K token 的价格（美元）：(prompt, completion)
static MODEL_PRICES: phf::Map<&'static str, (f64, f64)> = phf_map! {
    "gpt-3.5-turbo" => (0.0005, 0.0015),
    "gpt-3.5-turbo-0125" => (0.0005, 0.0015),
    "gpt-3.5-turbo-16k" => (0.003, 0.004),
    "gpt-4" => (0.03, 0.06),
    "gpt-4-32k" => (0.06, 0.12),
    "gpt-4-turbo" => (0.01, 0.03),
    "gpt-4o" => (0.0025, 0.01),
    "gpt-4o-mini" => (0.00015, 0.0006),
};

/// 一次生成中所有远程调用的 token 用量
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// 估算费用（美元）
    pub total_cost: f64,
}

impl TokenUsage {
    /// 根据模型价格表计算一次调用的用量，未知模型费用记为 0
    pub fn for_call(model: &str, prompt_tokens: u64, completion_tokens: u64) -> Self {
        let cost = price_for(model)
            .map(|(prompt_price, completion_price)| {
                prompt_tokens as f64 / 1000.0 * prompt_price
                    + completion_tokens as f64 / 1000.0 * completion_price
            })
            .unwrap_or(0.0);

        Self {
            total_tokens: prompt_tokens + completion_tokens,
            prompt_tokens,
            completion_tokens,
            total_cost: cost,
        }
    }

    /// 累加另一次调用
    pub fn add(&mut self, other: &TokenUsage) {
        self.total_tokens += other.total_tokens;
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_cost += other.total_cost;
    }

    /// 侧边栏展示用的四行文本
    pub fn display_lines(&self) -> [String; 4] {
        [
            format!("Total Tokens: {}", self.total_tokens),
            format!("Prompt Tokens: {}", self.prompt_tokens),
            format!("Completion Tokens: {}", self.completion_tokens),
            format!("Total Cost (USD): ${:.4}", self.total_cost),
        ]
    }
}

/// 查询模型价格，带日期后缀的模型名（如 gpt-4o-2024-08-06）按前缀匹配
fn price_for(model: &str) -> Option<(f64, f64)> {
    if let Some(price) = MODEL_PRICES.get(model) {
        return Some(*price);
    }
    MODEL_PRICES
        .entries()
        .filter(|(name, _)| model.starts_with(**name))
        .max_by_key(|(name, _)| name.len())
        .map(|(_, price)| *price)
}
