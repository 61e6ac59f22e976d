use std::{
    env,
    fmt::{self, Display, Formatter},
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};
use toml::{value::Table, Value};
use tracing::{trace, warn};
use ConfigError::*;

const CONFIG_ENV_VAR: &str = "CODEBITES_CONFIG";
const USERS_URL_ENV_VAR: &str = "CODEBITES_USERS_SERVICE_URL";
const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_TOKEN_PATH: &str = ".codebites/storage.json";

lazy_static! {
    pub static ref CONFIG: Config = Config::load().unwrap_or_else(|e| {
        warn!("falling back to an empty config: {}", e);
        Config::default()
    });
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    WrongType(String),
    Io(io::Error),
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            NotFound(ref k) => write!(f, "config key not found: {}", k),
            WrongType(ref k) => write!(f, "config key has the wrong type: {}", k),
            Io(ref e) => write!(f, "error reading config file: {}", e),
            Parse(ref e) => write!(f, "error parsing config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Parse(err)
    }
}

#[derive(Debug)]
pub struct Config {
    inner: Value,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inner: Value::Table(Table::new()),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Config {
            inner: s.parse::<Value>()?,
        })
    }
}

impl Config {
    /// Loads the file named by `CODEBITES_CONFIG` (or `config.toml`) relative
    /// to the current directory.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = env::current_dir()?.join(
            env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned()),
        );
        Self::from_path(config_path)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        trace!("Loading config file: {}", path.as_ref().display());
        fs::read_to_string(path)?.parse()
    }

    pub fn get<'a, 'b>(&'a self, key: &'b str) -> Result<&'a str, ConfigError> {
        trace!("Reading config key: {}", key);
        self._get_nested(key)?
            .as_str()
            .ok_or_else(|| WrongType(key.to_owned()))
    }

    pub fn services<'a>(&'a self) -> Result<impl Iterator<Item = &'a String> + 'a, ConfigError> {
        Ok(self
            ._get("services")?
            .as_table()
            .ok_or_else(|| WrongType("services".to_owned()))?
            .keys())
    }

    /// Base URL of the users service. The environment wins over the file so a
    /// deployment can point the client elsewhere without editing config.
    pub fn users_service_url(&self) -> Result<String, ConfigError> {
        if let Ok(url) = env::var(USERS_URL_ENV_VAR) {
            return Ok(url);
        }
        self.get("services.users.url").map(|url| url.to_owned())
    }

    pub fn token_path(&self) -> PathBuf {
        match self.get("client.token_path") {
            Ok(path) => PathBuf::from(path),
            Err(_) => PathBuf::from(DEFAULT_TOKEN_PATH),
        }
    }

    fn _get_nested(&self, key: &str) -> Result<&Value, ConfigError> {
        let mut keys = key.split('.');
        let mut path = keys.next().unwrap_or_default().to_owned();
        let mut value = self._get(&path)?;
        for key in keys {
            path = format!("{}.{}", path, key);
            value = value.get(key).ok_or_else(|| NotFound(path.to_owned()))?;
        }
        Ok(value)
    }

    fn _get<'a, 'b>(&'a self, key: &'b str) -> Result<&'a Value, ConfigError> {
        self.inner.get(key).ok_or_else(|| NotFound(key.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> Config {
        let config_toml = toml::toml! {
            [client]
            title="Code Bites"
            token_path="/tmp/codebites/storage.json"

            [services.users]
            url="http://localhost:5001"

            [services.questions]
            url="http://localhost:5002"
        };

        Config { inner: config_toml }
    }

    #[test]
    fn test_config() {
        let cfg = sample();

        assert_matches!(cfg.get("foo"), Err(NotFound(k)) if k == "foo");
        assert_matches!(cfg.get("services"), Err(WrongType(k)) if k == "services");
        assert_eq!(
            cfg.services().unwrap().collect::<Vec<_>>(),
            vec!["questions", "users"]
        );
        assert_eq!(cfg.get("client.title").unwrap(), "Code Bites");
        assert_matches!(cfg.get("services.users.foo"), Err(NotFound(k)) if k == "services.users.foo");
        assert_matches!(cfg.get("services.users"), Err(WrongType(k)) if k == "services.users");
        assert_eq!(
            cfg.token_path(),
            PathBuf::from("/tmp/codebites/storage.json")
        );
    }

    #[test]
    fn test_users_service_url_from_file() {
        let cfg = sample();
        if env::var(USERS_URL_ENV_VAR).is_err() {
            assert_eq!(cfg.users_service_url().unwrap(), "http://localhost:5001");
        }
    }

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_matches!(cfg.get("client.title"), Err(NotFound(k)) if k == "client");
        assert_matches!(cfg.services().map(|keys| keys.count()), Err(NotFound(k)) if k == "services");
        assert_eq!(cfg.token_path(), PathBuf::from(DEFAULT_TOKEN_PATH));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[services.users]\nurl = \"http://users:5000\"").unwrap();

        let cfg = Config::from_path(file.path()).unwrap();
        assert_eq!(cfg.get("services.users.url").unwrap(), "http://users:5000");

        assert_matches!(
            "[services".parse::<Config>(),
            Err(Parse(_))
        );
        assert_matches!(
            Config::from_path("/definitely/not/here.toml"),
            Err(Io(_))
        );
    }
}
