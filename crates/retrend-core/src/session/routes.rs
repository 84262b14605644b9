use super::AuthState;

/// Views reachable through navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    AdSuccess,
    PreviewAd { id: String },
    SellForm { category: String, item: String },
    Chat { conversation: Option<(String, String)> },
    MobileChat { id: String, peer: String },
    EditProfile,
    Profile,
    MyAds,
    Sell,
    Wishlist,
    SearchResults,
    PublicProfile { email: String },
    Category { name: String },
}

impl Route {
    /// Mounted only while a session is present
    pub fn is_guarded(&self) -> bool {
        matches!(
            self,
            Route::Chat { .. }
                | Route::MobileChat { .. }
                | Route::EditProfile
                | Route::Profile
                | Route::MyAds
                | Route::Sell
                | Route::Wishlist
        )
    }

    /// Anonymous visitors hitting these get the login prompt instead of a 404
    fn prompts_login(&self) -> bool {
        matches!(self, Route::Sell | Route::Wishlist)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch {
    View(Route),
    /// Login modal rendered over the home view
    LoginPrompt(Route),
    NotFound,
}

fn parse(path: &str) -> Option<Route> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let route = match segments.as_slice() {
        [] => Route::Home,
        ["adsuccess"] => Route::AdSuccess,
        ["preview_ad", id] => Route::PreviewAd { id: id.to_string() },
        ["attributes", category, item] => Route::SellForm {
            category: category.to_string(),
            item: item.to_string(),
        },
        ["chat"] => Route::Chat { conversation: None },
        ["chat", id, peer] => Route::Chat {
            conversation: Some((id.to_string(), peer.to_string())),
        },
        ["mobile-chat", id, peer] => Route::MobileChat {
            id: id.to_string(),
            peer: peer.to_string(),
        },
        ["editprofile"] => Route::EditProfile,
        ["profile"] => Route::Profile,
        ["profile", email] => Route::PublicProfile { email: email.to_string() },
        ["myads"] => Route::MyAds,
        ["sell"] => Route::Sell,
        ["wishlist"] => Route::Wishlist,
        ["results"] => Route::SearchResults,
        [name] => Route::Category { name: name.to_string() },
        _ => return None,
    };
    Some(route)
}

/// Resolve a navigation path under the current session state.
///
/// Guarded routes are unmounted while anonymous: `/sell` and `/wishlist`
/// show the login prompt, the rest are not found. A guarded single-segment
/// path never falls through to the category view.
pub fn resolve_route(path: &str, state: AuthState) -> RouteMatch {
    match parse(path) {
        Some(route) if route.is_guarded() && !state.is_authenticated() => {
            if route.prompts_login() {
                RouteMatch::LoginPrompt(route)
            } else {
                RouteMatch::NotFound
            }
        }
        Some(route) => RouteMatch::View(route),
        None => RouteMatch::NotFound,
    }
}
