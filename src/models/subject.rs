/// 科目（表单下拉选项）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subject {
    #[default]
    MachineLearning,
    Science,
    Mathematics,
    English,
    History,
    Geography,
    ComputerScience,
}

impl Subject {
    /// 下拉框中的顺序
    pub const ALL: [Subject; 7] = [
        Subject::MachineLearning,
        Subject::Science,
        Subject::Mathematics,
        Subject::English,
        Subject::History,
        Subject::Geography,
        Subject::ComputerScience,
    ];

    /// 获取标准名称（也是发给模型的文本）
    pub fn name(self) -> &'static str {
        match self {
            Subject::MachineLearning => "Machine Learning",
            Subject::Science => "Science",
            Subject::Mathematics => "Mathematics",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::ComputerScience => "Computer Science",
        }
    }

    /// 精确匹配名称（忽略大小写）
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|subject| subject.name().eq_ignore_ascii_case(s))
    }

    /// 智能查找：精确名称 → 1 开始的序号 → 模糊匹配
    pub fn find(s: &str) -> Option<Self> {
        if let Some(subject) = Self::from_name(s) {
            return Some(subject);
        }

        if let Ok(index) = s.trim().parse::<usize>() {
            return index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }

        // 模糊匹配
        let s_lower = s.trim().to_lowercase();
        if s_lower.is_empty() {
            return None;
        }
        match s_lower.as_str() {
            "ml" => return Some(Subject::MachineLearning),
            "cs" => return Some(Subject::ComputerScience),
            "math" | "maths" => return Some(Subject::Mathematics),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|subject| subject.name().to_lowercase().starts_with(&s_lower))
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 出题语气 / 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tone {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Easy, Tone::Medium, Tone::Hard];

    pub fn name(self) -> &'static str {
        match self {
            Tone::Easy => "Easy",
            Tone::Medium => "Medium",
            Tone::Hard => "Hard",
        }
    }

    pub fn find(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied());
        }
        let s_lower = s.to_lowercase();
        if s_lower.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|tone| tone.name().to_lowercase().starts_with(&s_lower))
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
