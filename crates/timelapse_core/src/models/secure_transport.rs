//! Implicit FTPS transport for the printer's file server.
//!
//! TLS is negotiated as soon as the TCP connection is up, before the server
//! banner. The FTP client is handed an upgrade capability ([`ImplicitTls`])
//! and runs every socket it opens through it: the control socket at connect
//! time and each passive data socket before a listing or transfer.

use std::sync::Arc;

use async_trait::async_trait;
use futures::io::AsyncReadExt;
use futures_rustls::TlsConnector;
use futures_rustls::rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use futures_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use futures_rustls::rustls::{self, ClientConfig, DigitallySignedStruct, SignatureScheme};
use suppaftp::types::FileType;
use suppaftp::{AsyncRustlsConnector, AsyncRustlsFtpStream, FtpError, Mode, Status};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::models::config::ConnectionConfig;
use crate::models::remote::{RemoteConnector, RemoteError, RemoteStore};

/// Read size for the data channel
const TRANSFER_CHUNK_SIZE: usize = 64 * 1024;

/// Upgrades any raw connection to an encrypted one.
///
/// Printers serve a self-signed certificate, so the server certificate is
/// not verified and SNI is disabled.
#[derive(Clone)]
pub struct ImplicitTls {
    config: Arc<ClientConfig>,
}

impl ImplicitTls {
    pub fn new() -> Self {
        let mut config = ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth();
        config.enable_sni = false;

        Self {
            config: Arc::new(config),
        }
    }

    fn upgrader(&self) -> AsyncRustlsConnector {
        AsyncRustlsConnector::from(TlsConnector::from(self.config.clone()))
    }

    /// Connect, log in and switch the data channel to protected mode
    pub async fn open(&self, config: &ConnectionConfig) -> Result<FtpsSession, RemoteError> {
        let address = config.address();
        log::debug!("Opening implicit FTPS connection to {}", address);

        let mut stream = AsyncRustlsFtpStream::connect_secure_implicit(
            address.as_str(),
            self.upgrader(),
            &config.host,
        )
        .await?;

        stream
            .login(config.username.as_str(), config.password.as_str())
            .await?;
        log::debug!("Logged in as {}", config.username);

        // PROT P only takes effect after PBSZ
        stream.custom_command("PBSZ 0", &[Status::CommandOk]).await?;
        stream.custom_command("PROT P", &[Status::CommandOk]).await?;
        stream.transfer_type(FileType::Binary).await?;
        stream.set_mode(Mode::Passive);

        Ok(FtpsSession { stream })
    }
}

impl Default for ImplicitTls {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteConnector for ImplicitTls {
    type Session = FtpsSession;

    async fn connect(&self, config: &ConnectionConfig) -> Result<FtpsSession, RemoteError> {
        self.open(config).await
    }
}

/// An authenticated session whose control and data sockets are all TLS
pub struct FtpsSession {
    stream: AsyncRustlsFtpStream,
}

#[async_trait]
impl RemoteStore for FtpsSession {
    async fn list_names(&mut self) -> Result<Vec<String>, RemoteError> {
        match self.stream.nlst(None).await {
            Ok(names) => Ok(names),
            Err(FtpError::UnexpectedResponse(ref response))
                if is_no_files_found(&response.status, &response.body) =>
            {
                Err(RemoteError::NoFilesFound)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        self.stream.cwd(path).await?;
        Ok(())
    }

    async fn file_size(&mut self, name: &str) -> Result<u64, RemoteError> {
        let size = self.stream.size(name).await?;
        Ok(size as u64)
    }

    async fn retrieve(
        &mut self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, RemoteError> {
        let mut data_stream = self.stream.retr_as_stream(name).await?;
        let copied = copy_data(&mut data_stream, sink).await;

        // The end-of-transfer reply (226, or 426 after a broken transfer) is
        // consumed either way, so the next command reads its own reply.
        let completion = self.stream.finalize_retr_stream(data_stream).await;

        match (copied, completion) {
            (Ok(total), Ok(())) => Ok(total),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Err(reply)) => {
                log::debug!("Transfer of {} closed with: {}", name, reply);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
        }
    }

    async fn delete(&mut self, name: &str) -> Result<(), RemoteError> {
        self.stream.rm(name).await?;
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), RemoteError> {
        self.stream.quit().await?;
        Ok(())
    }
}

async fn copy_data<R>(
    data_stream: &mut R,
    sink: &mut (dyn AsyncWrite + Unpin + Send),
) -> Result<u64, RemoteError>
where
    R: futures::io::AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; TRANSFER_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = data_stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        sink.write_all(&chunk[..n]).await?;
        total += n as u64;
    }
    sink.flush().await?;

    Ok(total)
}

/// The printer answers `NLST` on an empty folder with `550 No files found`
fn is_no_files_found(status: &Status, body: &[u8]) -> bool {
    matches!(status, Status::FileUnavailable)
        && String::from_utf8_lossy(body).contains("No files found")
}

#[derive(Debug)]
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
