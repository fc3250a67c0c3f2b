//! 手入力レジュメのデータモデル（「ゼロから作成」タブ）
//!
//! バックエンドには送信しない。各エントリのIDはリストのキーと
//! その場編集のためだけに使うローカルID。

use serde::{Deserialize, Serialize};

/// ローカルエントリID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 個人情報の項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FullName,
    Email,
    Phone,
    Location,
    Linkedin,
    Github,
    Website,
    Summary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
    pub summary: String,
}

impl PersonalInfo {
    pub fn get(&self, field: PersonalField) -> &str {
        match field {
            PersonalField::FullName => &self.full_name,
            PersonalField::Email => &self.email,
            PersonalField::Phone => &self.phone,
            PersonalField::Location => &self.location,
            PersonalField::Linkedin => &self.linkedin,
            PersonalField::Github => &self.github,
            PersonalField::Website => &self.website,
            PersonalField::Summary => &self.summary,
        }
    }

    fn field_mut(&mut self, field: PersonalField) -> &mut String {
        match field {
            PersonalField::FullName => &mut self.full_name,
            PersonalField::Email => &mut self.email,
            PersonalField::Phone => &mut self.phone,
            PersonalField::Location => &mut self.location,
            PersonalField::Linkedin => &mut self.linkedin,
            PersonalField::Github => &mut self.github,
            PersonalField::Website => &mut self.website,
            PersonalField::Summary => &mut self.summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: Vec<String>,
}

impl Experience {
    /// テキストエリアの内容を行ごとに分割して設定
    pub fn set_description_text(&mut self, text: &str) {
        self.description = text.split('\n').map(|line| line.to_string()).collect();
    }

    pub fn description_text(&self) -> String {
        self.description.join("\n")
    }
}

/// スキルレベル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
            SkillLevel::Expert => "Expert",
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkillLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown skill level: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: EntryId,
    pub name: String,
    pub level: SkillLevel,
    pub category: String,
}

/// 手入力レジュメ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
    #[serde(skip)]
    next_id: u64,
}

impl ResumeData {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> EntryId {
        // デシリアライズ後でも既存IDと衝突しないようにする
        let max_existing = self
            .education
            .iter()
            .map(|e| e.id.0)
            .chain(self.experience.iter().map(|e| e.id.0))
            .chain(self.skills.iter().map(|s| s.id.0))
            .max()
            .map_or(0, |m| m + 1);
        self.next_id = self.next_id.max(max_existing);
        let id = EntryId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn set_personal(&mut self, field: PersonalField, value: impl Into<String>) {
        *self.personal_info.field_mut(field) = value.into();
    }

    // --- 学歴 ---

    pub fn add_education(&mut self) -> EntryId {
        let id = self.allocate_id();
        self.education.push(Education {
            id,
            degree: String::new(),
            institution: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
        });
        id
    }

    pub fn update_education(&mut self, id: EntryId, edit: impl FnOnce(&mut Education)) -> bool {
        match self.education.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                edit(entry);
                true
            }
            None => false,
        }
    }

    pub fn remove_education(&mut self, id: EntryId) -> bool {
        let before = self.education.len();
        self.education.retain(|e| e.id != id);
        self.education.len() != before
    }

    // --- 職歴 ---

    pub fn add_experience(&mut self) -> EntryId {
        let id = self.allocate_id();
        self.experience.push(Experience {
            id,
            title: String::new(),
            company: String::new(),
            location: String::new(),
            start_date: String::new(),
            end_date: String::new(),
            current: false,
            description: Vec::new(),
        });
        id
    }

    pub fn update_experience(&mut self, id: EntryId, edit: impl FnOnce(&mut Experience)) -> bool {
        match self.experience.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                edit(entry);
                true
            }
            None => false,
        }
    }

    pub fn remove_experience(&mut self, id: EntryId) -> bool {
        let before = self.experience.len();
        self.experience.retain(|e| e.id != id);
        self.experience.len() != before
    }

    // --- スキル ---

    pub fn add_skill(&mut self) -> EntryId {
        let id = self.allocate_id();
        self.skills.push(Skill {
            id,
            name: String::new(),
            level: SkillLevel::default(),
            category: "Technical".to_string(),
        });
        id
    }

    pub fn update_skill(&mut self, id: EntryId, edit: impl FnOnce(&mut Skill)) -> bool {
        match self.skills.iter_mut().find(|s| s.id == id) {
            Some(entry) => {
                edit(entry);
                true
            }
            None => false,
        }
    }

    pub fn remove_skill(&mut self, id: EntryId) -> bool {
        let before = self.skills.len();
        self.skills.retain(|s| s.id != id);
        self.skills.len() != before
    }

    /// 未入力の必須項目
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.personal_info.full_name.trim().is_empty() {
            missing.push("full name");
        }
        if self.personal_info.email.trim().is_empty() {
            missing.push("email");
        }
        missing
    }

    /// ライブプレビュー用HTML
    pub fn render_preview_html(&self) -> String {
        let info = &self.personal_info;
        let mut html = String::from("<article class=\"resume-preview\">");

        let name = if info.full_name.trim().is_empty() {
            "Your Name"
        } else {
            info.full_name.as_str()
        };
        html.push_str(&format!("<header><h1>{}</h1>", escape_html(name)));
        let contact: Vec<&str> = [&info.email, &info.phone, &info.location]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !contact.is_empty() {
            html.push_str(&format!("<p>{}</p>", escape_html(&contact.join(" • "))));
        }
        html.push_str("</header>");

        if !info.summary.trim().is_empty() {
            html.push_str(&format!(
                "<section><h2>Professional Summary</h2><p>{}</p></section>",
                escape_html(&info.summary)
            ));
        }

        if !self.experience.is_empty() {
            html.push_str("<section><h2>Experience</h2>");
            for exp in &self.experience {
                let end = if exp.current { "Present" } else { exp.end_date.as_str() };
                html.push_str(&format!(
                    "<div><h3>{}</h3><p>{}</p><p>{} - {}</p><ul>",
                    escape_html(&exp.title),
                    escape_html(&exp.company),
                    escape_html(&exp.start_date),
                    escape_html(end)
                ));
                for line in exp.description.iter().filter(|l| !l.trim().is_empty()) {
                    html.push_str(&format!("<li>{}</li>", escape_html(line)));
                }
                html.push_str("</ul></div>");
            }
            html.push_str("</section>");
        }

        if !self.education.is_empty() {
            html.push_str("<section><h2>Education</h2>");
            for edu in &self.education {
                html.push_str(&format!(
                    "<div><p>{}</p><p>{}</p><p>{} - {}</p></div>",
                    escape_html(&edu.degree),
                    escape_html(&edu.institution),
                    escape_html(&edu.start_date),
                    escape_html(&edu.end_date)
                ));
            }
            html.push_str("</section>");
        }

        if !self.skills.is_empty() {
            html.push_str("<section><h2>Skills</h2><ul>");
            for skill in &self.skills {
                html.push_str(&format!(
                    "<li>{} <span>{}</span></li>",
                    escape_html(&skill.name),
                    skill.level.as_str()
                ));
            }
            html.push_str("</ul></section>");
        }

        html.push_str("</article>");
        html
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let data = ResumeData::new();
        assert!(data.education.is_empty());
        assert!(data.experience.is_empty());
        assert!(data.skills.is_empty());
        assert_eq!(data.missing_required(), vec!["full name", "email"]);
    }

    #[test]
    fn test_entry_ids_unique_across_lists() {
        let mut data = ResumeData::new();
        let a = data.add_education();
        let b = data.add_experience();
        let c = data.add_skill();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_update_and_remove_in_place() {
        let mut data = ResumeData::new();
        let first = data.add_education();
        let second = data.add_education();

        assert!(data.update_education(second, |e| e.degree = "BSc".to_string()));
        assert_eq!(data.education[0].degree, "");
        assert_eq!(data.education[1].degree, "BSc");

        assert!(data.remove_education(first));
        assert_eq!(data.education.len(), 1);
        assert_eq!(data.education[0].id, second);
        assert!(!data.remove_education(first));
    }

    #[test]
    fn test_update_unknown_id() {
        let mut data = ResumeData::new();
        let id = data.add_skill();
        data.remove_skill(id);
        assert!(!data.update_skill(id, |s| s.name = "Rust".into()));
    }

    #[test]
    fn test_skill_defaults() {
        let mut data = ResumeData::new();
        let id = data.add_skill();
        let skill = data.skills.iter().find(|s| s.id == id).unwrap();
        assert_eq!(skill.level, SkillLevel::Intermediate);
        assert_eq!(skill.category, "Technical");
    }

    #[test]
    fn test_skill_level_parse() {
        assert_eq!("expert".parse::<SkillLevel>().unwrap(), SkillLevel::Expert);
        assert!("guru".parse::<SkillLevel>().is_err());
    }

    #[test]
    fn test_description_lines() {
        let mut data = ResumeData::new();
        let id = data.add_experience();
        data.update_experience(id, |e| e.set_description_text("Built APIs\nLed team"));
        assert_eq!(data.experience[0].description, vec!["Built APIs", "Led team"]);
        assert_eq!(data.experience[0].description_text(), "Built APIs\nLed team");
    }

    #[test]
    fn test_set_personal() {
        let mut data = ResumeData::new();
        data.set_personal(PersonalField::FullName, "Jane Doe");
        data.set_personal(PersonalField::Email, "jane@example.com");
        assert_eq!(data.personal_info.full_name, "Jane Doe");
        assert_eq!(data.personal_info.get(PersonalField::Email), "jane@example.com");
        assert!(data.missing_required().is_empty());
    }

    #[test]
    fn test_render_preview() {
        let mut data = ResumeData::new();
        data.set_personal(PersonalField::FullName, "Jane <Doe>");
        data.set_personal(PersonalField::Email, "jane@example.com");
        data.set_personal(PersonalField::Summary, "Engineer");
        let id = data.add_experience();
        data.update_experience(id, |e| {
            e.title = "Developer".into();
            e.start_date = "2020-01-01".into();
            e.current = true;
            e.set_description_text("Shipped things\n");
        });

        let html = data.render_preview_html();
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(html.contains("Professional Summary"));
        assert!(html.contains("2020-01-01 - Present"));
        assert!(html.contains("<li>Shipped things</li>"));
        assert!(!html.contains("<li></li>"));
        assert!(!html.contains("Education"));
    }

    #[test]
    fn test_render_placeholder_name() {
        let html = ResumeData::new().render_preview_html();
        assert!(html.contains("Your Name"));
    }

    #[test]
    fn test_ids_after_deserialize() {
        let mut data = ResumeData::new();
        data.add_skill();
        data.add_skill();
        let json = serde_json::to_string(&data).expect("シリアライズ失敗");
        let mut restored: ResumeData = serde_json::from_str(&json).expect("デシリアライズ失敗");
        let id = restored.add_skill();
        assert!(restored.skills[..2].iter().all(|s| s.id != id));
    }
}
