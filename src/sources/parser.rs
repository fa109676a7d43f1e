use rss::Channel;

use crate::errors::ParseError;

/// Channel-level fields and items of one fetched RSS document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFeedDocument {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<ParsedItem>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    /// Raw `pubDate` text, parsed later by the normalizer.
    pub pub_date: Option<String>,
}

/// Decode an RSS 2.0 document. Unknown elements and attributes are ignored;
/// anything that is not a well-formed `<rss><channel>` document fails as a whole.
pub fn parse_document(bytes: &[u8]) -> Result<ParsedFeedDocument, ParseError> {
    let channel = Channel::read_from(bytes).map_err(|e| ParseError(e.to_string()))?;
    Ok(ParsedFeedDocument::from(channel))
}

impl From<Channel> for ParsedFeedDocument {
    fn from(channel: Channel) -> Self {
        let items = channel
            .items()
            .iter()
            .map(|item| ParsedItem {
                title: item.title().map(|s| s.to_string()),
                link: item.link().map(|s| s.to_string()),
                description: item.description().map(|s| s.to_string()),
                pub_date: item.pub_date().map(|s| s.to_string()),
            })
            .collect();

        Self {
            title: channel.title().to_string(),
            link: channel.link().to_string(),
            description: channel.description().to_string(),
            items,
        }
    }
}
