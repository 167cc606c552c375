use reqwest::Url;

/// The closed set of games supported by the HoYoLAB check-in event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Zzz,
    Gi,
    Hsr,
    Hi3,
    Tot,
}

impl Game {
    pub const ALL: [Game; 5] = [Game::Zzz, Game::Gi, Game::Hsr, Game::Hi3, Game::Tot];

    pub fn parse(code: &str) -> Option<Game> {
        match code.to_lowercase().as_str() {
            "zzz" => Some(Game::Zzz),
            "gi" => Some(Game::Gi),
            "hsr" => Some(Game::Hsr),
            "hi3" => Some(Game::Hi3),
            "tot" => Some(Game::Tot),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Game::Zzz => "zzz",
            Game::Gi => "gi",
            Game::Hsr => "hsr",
            Game::Hi3 => "hi3",
            Game::Tot => "tot",
        }
    }

    pub fn label(&self) -> String {
        self.code().to_uppercase()
    }

    /// Check-in endpoint, with the event's activity id embedded in the query string.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Game::Zzz => "https://sg-act-nap-api.hoyolab.com/event/luna/zzz/os/sign?act_id=e202406031448091",
            Game::Gi => "https://sg-hk4e-api.hoyolab.com/event/sol/sign?act_id=e202102251931481",
            Game::Hsr => "https://sg-public-api.hoyolab.com/event/luna/os/sign?act_id=e202303301540311",
            Game::Hi3 => "https://sg-public-api.hoyolab.com/event/mani/sign?act_id=e202110291205111",
            Game::Tot => "https://sg-public-api.hoyolab.com/event/luna/os/sign?act_id=e202202281857121",
        }
    }

    /// The activity id is not stored separately, it is read back out of the endpoint URL.
    pub fn act_id(&self) -> Option<String> {
        let url = Url::parse(self.endpoint()).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "act_id")
            .map(|(_, value)| value.into_owned())
    }
}
