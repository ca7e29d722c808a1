/// Pages the site can serve.
///
/// Routes, links and the active menu item are all keyed by this enum, so two
/// endpoints are the same page exactly when they are the same variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// The landing page with the reverser widget.
    Home,
    /// Static information page.
    About,
}

impl Endpoint {
    /// Every endpoint, in menu order.
    pub const ALL: [Endpoint; 2] = [Endpoint::Home, Endpoint::About];

    /// Page title and menu label.
    pub fn title(self) -> &'static str {
        match self {
            Endpoint::Home => "Home",
            Endpoint::About => "About",
        }
    }
}
