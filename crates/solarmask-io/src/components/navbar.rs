//! Top navigation between the app's pages.

use dioxus::prelude::*;
use dioxus_free_icons::Icon;
use dioxus_free_icons::icons::ld_icons::LdSun;

/// A top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// Landing page.
    #[default]
    Home,
    /// Upload and predict.
    Upload,
    /// Project background.
    About,
}

impl Page {
    /// Every page, in navigation order.
    pub const ALL: [Self; 3] = [Self::Home, Self::Upload, Self::About];

    /// Link text.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Upload => "Upload",
            Self::About => "About",
        }
    }
}

/// Props for the [`NavBar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct NavBarProps {
    /// The page being shown.
    current: Page,
    /// Called with the page the user picked.
    on_navigate: EventHandler<Page>,
}

/// Brand and page links.
#[component]
pub fn NavBar(props: NavBarProps) -> Element {
    rsx! {
        nav { class: "navbar",
            div { class: "navbar-brand",
                Icon { width: 22, height: 22, icon: LdSun }
                "Solar Flare Detector"
            }
            div { class: "navbar-links",
                for page in Page::ALL {
                    button {
                        key: "{page.title()}",
                        class: if page == props.current { "nav-link active" } else { "nav-link" },
                        onclick: move |_| props.on_navigate.call(page),
                        "{page.title()}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_is_the_landing_page() {
        assert_eq!(Page::default(), Page::Home);
        assert_eq!(Page::ALL[0], Page::Home);
    }

    #[test]
    fn titles_are_distinct() {
        let titles: Vec<_> = Page::ALL.iter().map(|p| p.title()).collect();
        assert_eq!(titles, ["Home", "Upload", "About"]);
    }
}
