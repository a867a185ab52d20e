use crate::protocol::parts::hdb_value::{emit_length_and_string, string_length};
use crate::HdbResult;
use std::collections::HashMap;
use std::env;
use std::path::Path;

// The session-variables map of the connection: string keys and string
// values that are sent to the server as ClientInfo part. The connection
// tracks whether the map was touched since it was last sent.
#[derive(Clone, Debug)]
pub(crate) struct ClientInfo(HashMap<String, String>);

impl Default for ClientInfo {
    fn default() -> Self {
        let mut ci = Self(HashMap::new());

        if let Some(os_str) = env::args_os().next() {
            let p = Path::new(&os_str);
            if let Some(s) = p.file_name() {
                ci.set_application(s.to_string_lossy());
            }
        }
        ci.set(ClientInfoKey::Driver.as_ref(), "hdbclient");
        ci.set(
            ClientInfoKey::DriverVersion.as_ref(),
            env!("CARGO_PKG_VERSION"),
        );

        ci
    }
}

impl std::fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        for (k, v) in &self.0 {
            writeln!(f, "{k} = {v}")?;
        }
        Ok(())
    }
}

impl ClientInfo {
    pub fn set_application<S: AsRef<str>>(&mut self, application: S) {
        self.set(ClientInfoKey::Application.as_ref(), application.as_ref());
    }
    pub fn set_application_version(&mut self, application_version: &str) {
        self.set(
            ClientInfoKey::ApplicationVersion.as_ref(),
            application_version,
        );
    }
    pub fn set_application_source(&mut self, application_source: &str) {
        self.set(
            ClientInfoKey::ApplicationSource.as_ref(),
            application_source,
        );
    }
    pub fn set_application_user(&mut self, application_user: &str) {
        self.set(ClientInfoKey::ApplicationUser.as_ref(), application_user);
    }

    // Arbitrary session variables are supported too.
    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
    pub fn unset(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn emit(&self, w: &mut dyn std::io::Write) -> HdbResult<()> {
        for (key, value) in &self.0 {
            emit_length_and_string(key, w)?;
            emit_length_and_string(value, w)?;
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        let mut len = 0;
        for (key, value) in &self.0 {
            len += string_length(key) + string_length(value);
        }
        len
    }
    pub fn count(&self) -> usize {
        self.0.len() * 2
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum ClientInfoKey {
    Application,
    ApplicationVersion,
    ApplicationSource,
    ApplicationUser,
    Driver,
    DriverVersion,
}
impl AsRef<str> for ClientInfoKey {
    fn as_ref(&self) -> &str {
        match &self {
            Self::Application => "APPLICATION",
            Self::ApplicationVersion => "APPLICATIONVERSION",
            Self::ApplicationSource => "APPLICATIONSOURCE",
            Self::ApplicationUser => "APPLICATIONUSER",
            Self::Driver => "DRIVER",
            Self::DriverVersion => "DRIVERVERSION",
        }
    }
}
