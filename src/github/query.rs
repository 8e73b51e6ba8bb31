use crate::config::FilterConfig;

/// A field `gh pr list --json` can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Number,
    Title,
    Author,
    HeadRefName,
    Url,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Number => "number",
            Field::Title => "title",
            Field::Author => "author",
            Field::HeadRefName => "headRefName",
            Field::Url => "url",
        }
    }
}

/// Matches a login containing any of the configured usernames. Case sensitive,
/// substring, OR'd. No usernames matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorFilter {
    usernames: Vec<String>,
}

impl AuthorFilter {
    pub fn new(usernames: &[String]) -> Self {
        Self {
            usernames: usernames.to_vec(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.usernames.is_empty()
    }

    pub fn matches(&self, login: &str) -> bool {
        self.is_noop() || self.usernames.iter().any(|u| login.contains(u.as_str()))
    }

    /// The same predicate as a jq pipeline stage, empty when there is nothing to filter.
    pub fn to_jq(&self) -> String {
        if self.is_noop() {
            return String::new();
        }
        let contains: Vec<String> = self
            .usernames
            .iter()
            .map(|u| format!("contains({})", jq_string(u)))
            .collect();
        format!(" | select(.author.login | {})", contains.join(" or "))
    }
}

/// JSON string literals are valid jq string literals.
fn jq_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Everything needed to list pull requests in one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub state: String,
    pub fields: Vec<Field>,
    pub drafts_only: bool,
    pub author_filter: AuthorFilter,
}

impl QuerySpec {
    /// Builds the query for `config` with an already resolved author set.
    pub fn build(config: &FilterConfig, resolved_authors: &[String]) -> QuerySpec {
        let mut state = vec!["state:open"];
        if !config.include_reviewed {
            state.push("-reviewed-by:@me");
        }
        if !config.include_mine {
            state.push("-author:@me");
        }

        let mut fields = vec![Field::Number, Field::Title, Field::Author, Field::HeadRefName];
        if config.show_urls {
            fields.push(Field::Url);
        }

        QuerySpec {
            state: state.join(" "),
            fields,
            drafts_only: config.show_drafts,
            author_filter: AuthorFilter::new(resolved_authors),
        }
    }

    pub fn jq(&self) -> String {
        format!("(.[]{})", self.author_filter.to_jq())
    }

    /// Arguments for `gh`.
    pub fn to_args(&self) -> Vec<String> {
        let fields: Vec<&str> = self.fields.iter().map(|f| f.as_str()).collect();
        let mut args = vec![
            "pr".to_string(),
            "list".to_string(),
            "--search".to_string(),
            self.state.clone(),
            "--json".to_string(),
            fields.join(","),
            "--jq".to_string(),
            self.jq(),
        ];
        if self.drafts_only {
            args.push("--draft".to_string());
        }
        args
    }
}
