//! Artifact bundle inspection and container lifecycle modes.
//!
//! Pure functions only; callers list the bundle root and pass the names in.

/// Compose definition file names, in order of preference.
pub const COMPOSE_FILES: [&str; 4] = [
    "docker-compose.yml",
    "docker-compose.yaml",
    "compose.yml",
    "compose.yaml",
];

/// Single-image build definition.
pub const DOCKERFILE: &str = "Dockerfile";

/// How the bundle is built and launched on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStrategy {
    /// `docker compose -f <file> up -d --build`.
    Compose { file: String },
    /// `docker build` + `docker run` of a single container.
    Dockerfile,
}

impl BuildStrategy {
    /// Pick a strategy from the names found at the bundle root.
    ///
    /// A compose definition wins over a Dockerfile. Returns `None` when the
    /// bundle has neither.
    #[must_use]
    pub fn select<S: AsRef<str>>(root_entries: &[S]) -> Option<Self> {
        let has = |wanted: &&str| root_entries.iter().any(|e| e.as_ref() == *wanted);
        if let Some(file) = COMPOSE_FILES.into_iter().find(|f| has(f)) {
            return Some(Self::Compose {
                file: file.to_string(),
            });
        }
        has(&DOCKERFILE).then_some(Self::Dockerfile)
    }

    /// Lifecycle mode this strategy produces.
    #[must_use]
    pub fn mode(&self) -> DeploymentMode {
        match self {
            Self::Compose { .. } => DeploymentMode::Compose,
            Self::Dockerfile => DeploymentMode::Container,
        }
    }

    /// File the remote launch block expects to find.
    #[must_use]
    pub fn definition_file(&self) -> &str {
        match self {
            Self::Compose { file } => file,
            Self::Dockerfile => DOCKERFILE,
        }
    }
}

/// Lifecycle mode recorded in the remote marker file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentMode {
    Compose,
    Container,
}

impl DeploymentMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compose => "compose",
            Self::Container => "container",
        }
    }

    /// Parse the marker file contents. Anything unexpected reads as unknown.
    #[must_use]
    pub fn from_marker(contents: &str) -> Option<Self> {
        match contents.trim() {
            "compose" => Some(Self::Compose),
            "container" => Some(Self::Container),
            _ => None,
        }
    }
}
