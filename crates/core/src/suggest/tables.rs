//! Fixed lookup tables behind the suggestion heuristics.

/// Correct terms and the misspellings users commonly type for them.
pub const SPELLING_CORRECTIONS: &[(&str, &[&str])] = &[
    ("birthday", &["birthdy", "brithday", "bday", "birhtday", "birthdya"]),
    ("anniversary", &["aniversary", "anniversery", "anniversay", "anivesary"]),
    ("congratulations", &["congrats", "congradulations", "congratulation", "congratz"]),
    ("wedding", &["weding", "wedig", "weddin", "wdding"]),
    ("graduation", &["graduaton", "gradution", "graduatoin"]),
    ("motivation", &["motivaton", "motavation", "motivashun"]),
    ("comedian", &["comedien", "comedain", "commedian"]),
    ("musician", &["musican", "musicain", "musicion"]),
    ("athlete", &["athelete", "athlet", "athleet"]),
    ("celebrity", &["celebraty", "celeb", "celebrety"]),
];

/// Creator categories and terms that hint at them.
pub const CATEGORY_TERMS: &[(&str, &[&str])] = &[
    ("comedy", &["funny", "comedian", "jokes", "humor", "laugh", "roast"]),
    ("music", &["singer", "musician", "song", "band", "rapper", "dj"]),
    ("sports", &["athlete", "football", "basketball", "soccer", "coach", "player"]),
    ("actors", &["actor", "actress", "movie", "film", "tv", "star"]),
    ("influencers", &["influencer", "youtuber", "tiktok", "creator", "streamer"]),
    ("motivation", &["motivational", "inspiration", "mentor", "speaker", "wellness"]),
];

/// Search terms and related alternatives, best alternative first.
pub const ALTERNATIVE_TERMS: &[(&str, &[&str])] = &[
    ("birthday", &["anniversary", "celebration", "special day"]),
    ("wedding", &["engagement", "marriage", "celebration"]),
    ("graduation", &["achievement", "milestone", "congratulations"]),
    ("motivation", &["inspiration", "encouragement", "pep talk"]),
    ("funny", &["comedy", "humor", "roast"]),
    ("congratulations", &["celebration", "achievement", "milestone"]),
    ("shoutout", &["personal message", "greeting", "video message"]),
];
