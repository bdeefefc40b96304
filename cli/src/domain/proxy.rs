//! nginx site record and rendering.

use std::net::Ipv4Addr;

use crate::domain::identity::DeploymentIdentity;

/// Port nginx listens on for every managed site.
pub const LISTEN_PORT: u16 = 80;

/// One reverse-proxy virtual host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySiteRecord {
    pub name: String,
    pub listen_port: u16,
    pub server_name: Ipv4Addr,
    pub upstream_port: u16,
}

impl ProxySiteRecord {
    #[must_use]
    pub fn for_identity(identity: &DeploymentIdentity) -> Self {
        Self {
            name: identity.name.as_str().to_string(),
            listen_port: LISTEN_PORT,
            server_name: identity.host,
            upstream_port: identity.internal_port,
        }
    }

    /// Address nginx forwards to.
    #[must_use]
    pub fn upstream(&self) -> String {
        format!("http://localhost:{}", self.upstream_port)
    }

    /// Render the `server { ... }` block.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "server {{
    listen {listen};
    server_name {server};

    location / {{
        proxy_pass {upstream};
        proxy_http_version 1.1;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection 'upgrade';
        proxy_set_header Host $host;
        proxy_set_header X-Real-IP $remote_addr;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header X-Forwarded-Proto $scheme;
        proxy_cache_bypass $http_upgrade;
    }}
}}
",
            listen = self.listen_port,
            server = self.server_name,
            upstream = self.upstream(),
        )
    }
}
