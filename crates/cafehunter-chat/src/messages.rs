//! Canned replies.

pub const WELCOME: &str =
    "Hi! I'm Cafe Hunter. Tell me where you are, like \"coffee near Ximen\", or share your location and I'll find cafes nearby.";
pub const ASK_LOCATION: &str = "Where would you like to have coffee? Type a place or share your location.";
pub const DO_NOT_UNDERSTAND: &str =
    "Sorry, I don't understand. Try something like \"cafe near Taipei 101\".";
pub const PLACE_NOT_RECOGNIZED: &str =
    "Sorry, I couldn't find that place. Could you describe it another way?";
pub const WHICH_PLACE: &str = "Which place did you mean?";
pub const WHICH_PHRASE: &str = "You mentioned a few places. Which one should I search around?";
pub const CONFIRM_PIN: &str = "Search for cafes near this point?";
pub const NOTHING_NEARBY: &str = "Sorry, there are no cafes nearby.";
pub const APOLOGY: &str = "Sorry, something went wrong. Please try again in a moment.";
pub const QUERY_ERROR: &str = "Sorry, I couldn't read that request.";
pub const CANCELLED: &str = "OK, maybe next time.";
pub const JOKE: &str = "Ha, you got me! Let me know when you really need a coffee.";

pub const CHOICE_NONE_OF_THESE: &str = "None of these";
pub const CHOICE_CANCEL: &str = "Never mind";
pub const CHOICE_YES: &str = "Yes";
pub const CHOICE_NO: &str = "No";

pub const OVERVIEW_TITLE: &str = "Cafes nearby";
pub const BUTTON_MAP: &str = "Open map";
pub const BUTTON_PAGE: &str = "Cafe page";
