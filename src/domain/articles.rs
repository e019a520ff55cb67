//! Built-in article catalog and article id validation.

/// Longest article id accepted on the `/articles/:article_id` route.
pub const MAX_ARTICLE_ID_LEN: usize = 64;

/// DeepL rejects request bodies above 128 KiB.
pub const MAX_ARTICLE_BODY_BYTES: usize = 120 * 1024;

/// Article served on `/`.
pub const DEFAULT_ARTICLE_ID: &str = "article-1-123";

/// An English source article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Article {
    pub id: &'static str,
    pub body: &'static str,
}

const LIVERPOOL_AT_LEEDS: Article = Article {
    id: DEFAULT_ARTICLE_ID,
    body: "Mohamed Salah and Diogo Jota both scored twice as Liverpool claimed a first win in five Premier League games by inflicting a second successive home hammering on Leeds United, who remain mired in a relegation battle. The Reds had not won since putting seven unanswered goals past Manchester United at the start of March, but after a slow start they ruthlessly dismantled Javi Gracia's hapless side. Trent Alexander-Arnold used an arm to control the ball but neither the referee or the VAR felt it worthy of penalising, before he drove forward to exchange passes with Salah and set up Cody Gakpo for the opener. The Egypt forward doubled his side's lead soon after, firing a sweet shot in after being set up by Jota to put the visitors in control. Leeds were given hope after the break when Luis Sinisterra dispossessed the ponderous Ibrahima Konate and cleverly chipped the ball beyond Alisson. However, Liverpool quickly responded through Jota's neat finish as the Portugal forward notched his first goal since April 2022. After seeing a goal ruled out for offside, Salah then slotted home his second at the end of a superb move to put the game to bed before Jota grabbed his second when he steered in a Jordan Henderson cross. Substitute Darwin Nunez completed the rout with a neat side-foot finish against a shambolic Whites side, who conceded five last weekend at home to Crystal Palace and now have the worst defensive record in the Premier League. On an encouraging night for the visitors, there was also a return to action for Luis Diaz as the Colombia winger made his first appearance since October as a late substitute. Jurgen Klopp's side remain eighth in the table, a point behind seventh-placed Brighton and two shy of Aston Villa in sixth.",
};

static CATALOG: &[Article] = &[LIVERPOOL_AT_LEEDS];

/// Look up an article by id.
pub fn find(id: &str) -> Option<&'static Article> {
    CATALOG.iter().find(|article| article.id == id)
}

/// Check that a caller-supplied article id is usable as a cache key.
pub fn validate_article_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("Article id must not be empty".to_string());
    }

    if id.len() > MAX_ARTICLE_ID_LEN {
        return Err(format!(
            "Article id must be at most {} characters",
            MAX_ARTICLE_ID_LEN
        ));
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err("Article id may only contain letters, digits, '-' and '_'".to_string());
    }

    Ok(())
}
