use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{select, tick, Sender};
use log::{debug, info, warn};

use crate::{
    constants::{MAX_PAYLOAD_BYTES, RESERVED_OBJECT_ID_START},
    sync::{
        channel::{ValueListener, ValueSender},
        channel_params::{ChannelParams, Destinations},
        error::{RegistryError, RegistryState},
        sync_object::{Binding, RegisteredObject, SyncObject, SyncPayload},
    },
    HostType, ObjectId, Role, SyncConfig,
};

/// Addresses a registry works with: its own base address (receivers listen
/// on `listen.port() + channel`) and the base addresses of its peers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistryEndpoints {
    pub listen: SocketAddr,
    pub peers: Vec<SocketAddr>,
}

struct Registration {
    object: Arc<dyn RegisteredObject>,
    reserved: bool,
}

struct Resender {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Owns a process's sync objects and the threads moving them.
///
/// UNINITIALIZED -> (`init`) -> (`start_synching`) RUNNING -> (`stop_synching`) STOPPED.
/// A stopped registry is never restarted.
pub struct SyncRegistry {
    host_type: HostType,
    endpoints: RegistryEndpoints,
    config: SyncConfig,
    registrations: Vec<Registration>,
    state: RegistryState,
    initialized: bool,
    running: Arc<AtomicBool>,
    listeners: Vec<JoinHandle<()>>,
    resender: Option<Resender>,
}

impl SyncRegistry {
    pub fn new(host_type: HostType, endpoints: RegistryEndpoints, config: SyncConfig) -> Self {
        Self {
            host_type,
            endpoints,
            config,
            registrations: Vec::new(),
            state: RegistryState::Uninitialized,
            initialized: false,
            running: Arc::new(AtomicBool::new(false)),
            listeners: Vec::new(),
            resender: None,
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn endpoints(&self) -> &RegistryEndpoints {
        &self.endpoints
    }

    pub fn object_count(&self) -> usize {
        self.registrations.len()
    }

    // Registration

    /// Binds `object` to `role` and adds it to this registry. Only legal
    /// before `init`.
    pub fn add_sync_object<T: SyncPayload>(
        &mut self,
        object: &SyncObject<T>,
        role: Role,
        params: ChannelParams,
    ) -> Result<(), RegistryError> {
        self.register(object, role, params, false)
    }

    /// Like `add_sync_object`, for the ids the library reserves for itself
    /// (view calibration).
    pub fn add_reserved_sync_object<T: SyncPayload>(
        &mut self,
        object: &SyncObject<T>,
        role: Role,
        params: ChannelParams,
    ) -> Result<(), RegistryError> {
        self.register(object, role, params, true)
    }

    fn register<T: SyncPayload>(
        &mut self,
        object: &SyncObject<T>,
        role: Role,
        params: ChannelParams,
        reserved: bool,
    ) -> Result<(), RegistryError> {
        if self.state != RegistryState::Uninitialized {
            return Err(RegistryError::InvalidState {
                operation: "add a sync object",
                state: self.state,
            });
        }
        if self.initialized {
            return Err(RegistryError::AlreadyInitialized);
        }

        let object = object.bind(role, params)?;
        debug!(
            "{}: registered sync object {} as {}",
            self.host_type,
            object.id(),
            role
        );
        self.registrations.push(Registration { object, reserved });
        Ok(())
    }

    /// Validates every registration and freezes the object set
    pub fn init(&mut self) -> Result<(), RegistryError> {
        if self.state != RegistryState::Uninitialized {
            return Err(RegistryError::InvalidState {
                operation: "initialize",
                state: self.state,
            });
        }
        if self.initialized {
            return Err(RegistryError::AlreadyInitialized);
        }

        let mut ids = HashSet::new();
        for registration in &self.registrations {
            let object = &registration.object;
            let id = object.id();

            if !ids.insert(id) {
                return Err(RegistryError::DuplicateObjectId { id });
            }
            if !registration.reserved && id >= RESERVED_OBJECT_ID_START {
                return Err(RegistryError::ReservedObjectId {
                    id,
                    reserved_start: RESERVED_OBJECT_ID_START,
                });
            }
            let length = object.payload_length();
            if length > MAX_PAYLOAD_BYTES {
                return Err(RegistryError::PayloadTooLarge {
                    id,
                    length,
                    max: MAX_PAYLOAD_BYTES,
                });
            }

            match object.binding() {
                Binding::Receiver { channel } => {
                    self.listen_address(id, *channel)?;
                }
                Binding::Sender { params } => {
                    self.resolve_destinations(id, params)?;
                }
            }
        }

        self.initialized = true;
        info!(
            "{}: sync registry initialized with {} objects",
            self.host_type,
            self.registrations.len()
        );
        Ok(())
    }

    // Lifecycle

    /// Binds sockets, spawns one listener per inbound port and the periodic
    /// sender, then marks every object started.
    pub fn start_synching(&mut self) -> Result<(), RegistryError> {
        if self.state != RegistryState::Uninitialized {
            return Err(RegistryError::InvalidState {
                operation: "start synching",
                state: self.state,
            });
        }
        if !self.initialized {
            return Err(RegistryError::NotInitialized);
        }

        self.running.store(true, Ordering::Release);
        match self.spawn_transport() {
            Ok(transmitters) => {
                for (registration, transmitter) in self.registrations.iter().zip(transmitters) {
                    registration.object.start(transmitter);
                }
                self.state = RegistryState::Running;
                info!(
                    "{}: synching {} objects on {} listener(s)",
                    self.host_type,
                    self.registrations.len(),
                    self.listeners.len()
                );
                Ok(())
            }
            Err(err) => {
                warn!("{}: failed to start synching: {}", self.host_type, err);
                self.join_threads();
                Err(err)
            }
        }
    }

    /// Signals every background thread, joins them and releases the
    /// sockets. A no-op unless the registry is running.
    pub fn stop_synching(&mut self) {
        if self.state != RegistryState::Running {
            debug!(
                "{}: stop_synching ignored, registry is {}",
                self.host_type, self.state
            );
            return;
        }

        self.join_threads();
        for registration in &self.registrations {
            registration.object.stop();
        }
        self.state = RegistryState::Stopped;
        info!("{}: sync registry stopped", self.host_type);
    }

    fn join_threads(&mut self) {
        self.running.store(false, Ordering::Release);

        if let Some(resender) = self.resender.take() {
            // a disconnected channel also ends the loop, so a failed send is fine
            let _ = resender.stop.send(());
            if resender.handle.join().is_err() {
                warn!("{}: sync sender thread panicked", self.host_type);
            }
        }
        for handle in self.listeners.drain(..) {
            if handle.join().is_err() {
                warn!("{}: sync listener thread panicked", self.host_type);
            }
        }
    }

    /// Returns one transmitter slot per registration, in registration order
    fn spawn_transport(&mut self) -> Result<Vec<Option<Arc<ValueSender>>>, RegistryError> {
        // Inbound: one socket per channel in use
        let mut by_channel: BTreeMap<u16, HashMap<ObjectId, Arc<dyn RegisteredObject>>> =
            BTreeMap::new();
        for registration in &self.registrations {
            if let Binding::Receiver { channel } = registration.object.binding() {
                by_channel
                    .entry(*channel)
                    .or_default()
                    .insert(registration.object.id(), Arc::clone(&registration.object));
            }
        }

        for (channel, objects) in by_channel {
            let first_id = objects.keys().copied().min().unwrap_or_default();
            let address = self.listen_address(first_id, channel)?;
            let socket = bind(address)?;
            socket
                .set_read_timeout(Some(self.config.listen_poll_interval))
                .map_err(|err| RegistryError::Bind {
                    address,
                    message: err.to_string(),
                })?;

            let listener = ValueListener::new(socket, objects, Arc::clone(&self.running));
            let name = format!("cavesync-listen-{}", address.port());
            let handle = spawn(name, move || listener.run())?;
            self.listeners.push(handle);
        }

        // Outbound: one shared socket for every sender
        let mut transmitters = Vec::with_capacity(self.registrations.len());
        let mut senders = Vec::new();
        let mut outbound: Option<Arc<UdpSocket>> = None;
        for registration in &self.registrations {
            let Binding::Sender { params } = registration.object.binding() else {
                transmitters.push(None);
                continue;
            };

            let socket = match &outbound {
                Some(shared) => Arc::clone(shared),
                None => {
                    let bound = Arc::new(bind(self.outbound_address())?);
                    outbound = Some(Arc::clone(&bound));
                    bound
                }
            };
            let destinations = self.resolve_destinations(registration.object.id(), params)?;
            transmitters.push(Some(Arc::new(ValueSender::new(socket, destinations))));
            senders.push(Arc::clone(&registration.object));
        }

        if !senders.is_empty() {
            let (stop, stopped) = crossbeam_channel::bounded::<()>(1);
            let interval = self.config.resend_interval;
            let handle = spawn("cavesync-resend".to_string(), move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(stopped) -> _ => break,
                        recv(ticker) -> _ => {
                            for object in &senders {
                                object.transmit_current();
                            }
                        }
                    }
                }
            })?;
            self.resender = Some(Resender { stop, handle });
        }

        Ok(transmitters)
    }

    fn listen_address(&self, id: ObjectId, channel: u16) -> Result<SocketAddr, RegistryError> {
        ChannelParams::new(channel)
            .channel_address(self.endpoints.listen)
            .filter(|address| address.port() != 0)
            .ok_or(RegistryError::InvalidEndpoint { id, channel })
    }

    fn resolve_destinations(
        &self,
        id: ObjectId,
        params: &ChannelParams,
    ) -> Result<Vec<SocketAddr>, RegistryError> {
        let bases = match &params.destinations {
            Destinations::AllPeers => &self.endpoints.peers,
            Destinations::Only(addresses) => addresses,
        };
        if bases.is_empty() {
            return Err(RegistryError::MissingEndpoint { id });
        }
        bases
            .iter()
            .map(|base| {
                params
                    .channel_address(*base)
                    .filter(|address| address.port() != 0)
                    .ok_or(RegistryError::InvalidEndpoint {
                        id,
                        channel: params.channel,
                    })
            })
            .collect()
    }

    fn outbound_address(&self) -> SocketAddr {
        let ip = match self.endpoints.listen.ip() {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        SocketAddr::new(ip, 0)
    }
}

impl Drop for SyncRegistry {
    fn drop(&mut self) {
        self.stop_synching();
    }
}

fn bind(address: SocketAddr) -> Result<UdpSocket, RegistryError> {
    UdpSocket::bind(address).map_err(|err| RegistryError::Bind {
        address,
        message: err.to_string(),
    })
}

fn spawn<F>(name: String, body: F) -> Result<JoinHandle<()>, RegistryError>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.clone())
        .spawn(body)
        .map_err(|err| RegistryError::Spawn {
            thread: name,
            message: err.to_string(),
        })
}
