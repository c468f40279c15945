//! Source locator: maps a (list, date) pair to the page that publishes it.

use std::sync::Arc;

use crate::domain::calendar::{Clock, DateError, TradingDate};
use crate::domain::movers::MoverList;

/// Placeholders substituted into a locator template.
pub const PLACEHOLDERS: [&str; 3] = ["{year}", "{month}", "{day}"];

/// Composite gainers page.
pub const DEFAULT_GAINERS_TEMPLATE: &str = "http://www.wsj.com/mdc/public/page/2_3021-gaincomp-gainer-{year}{month}{day}.html?mod=mdc_pastcalendar";

/// Composite losers page.
pub const DEFAULT_LOSERS_TEMPLATE: &str = "http://www.wsj.com/mdc/public/page/2_3021-losecomp-loser-{year}{month}{day}.html?mod=mdc_pastcalendar";

/// Locator templates, one per list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTemplates {
    /// Template for [`MoverList::Gainers`].
    pub gainers: String,
    /// Template for [`MoverList::Losers`].
    pub losers: String,
}

impl Default for SourceTemplates {
    fn default() -> Self {
        Self {
            gainers: DEFAULT_GAINERS_TEMPLATE.to_string(),
            losers: DEFAULT_LOSERS_TEMPLATE.to_string(),
        }
    }
}

impl SourceTemplates {
    /// Templates rooted at `base_url` using the default page paths.
    ///
    /// Handy for pointing the service at a mirror or a mock server.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let rebase = |template: &str| {
            template
                .strip_prefix("http://www.wsj.com")
                .map_or_else(|| template.to_string(), |path| format!("{base}{path}"))
        };
        Self {
            gainers: rebase(DEFAULT_GAINERS_TEMPLATE),
            losers: rebase(DEFAULT_LOSERS_TEMPLATE),
        }
    }

    /// Template for `list`.
    #[must_use]
    pub fn get(&self, list: MoverList) -> &str {
        match list {
            MoverList::Gainers => &self.gainers,
            MoverList::Losers => &self.losers,
        }
    }

    /// First (list, placeholder) pair missing from a template, if any.
    #[must_use]
    pub fn missing_placeholder(&self) -> Option<(MoverList, &'static str)> {
        MoverList::all().iter().find_map(|&list| {
            let template = self.get(list);
            PLACEHOLDERS
                .iter()
                .find(|p| !template.contains(*p))
                .map(|p| (list, *p))
        })
    }
}

/// Derives the remote locator for a movers list on a trading date.
#[derive(Clone)]
pub struct SourceLocator {
    templates: SourceTemplates,
    clock: Arc<dyn Clock>,
}

impl SourceLocator {
    /// Create a locator over `templates`, validating dates against `clock`.
    #[must_use]
    pub fn new(templates: SourceTemplates, clock: Arc<dyn Clock>) -> Self {
        Self { templates, clock }
    }

    /// The clock used for date validation.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Locator for `list` on `date`.
    ///
    /// The date is validated again before substitution, so no locator is
    /// ever produced for a date the validator would reject.
    pub fn locate(&self, list: MoverList, date: &TradingDate) -> Result<String, DateError> {
        let date = date.revalidate(self.clock.as_ref())?;

        Ok(self
            .templates
            .get(list)
            .replace("{year}", &format!("{:04}", date.year()))
            .replace("{month}", &format!("{:02}", date.month()))
            .replace("{day}", &format!("{:02}", date.day())))
    }
}

impl std::fmt::Debug for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceLocator")
            .field("templates", &self.templates)
            .field("today", &self.clock.today())
            .finish()
    }
}
