use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc, OnceLock, PoisonError, RwLock,
};

use log::{error, trace};

use cavesync_serde::{ByteReader, ByteWriter, Serde, SerdeErr};

use crate::{
    sync::{
        channel::ValueSender,
        channel_params::ChannelParams,
        error::{RegistryError, SyncObjectError},
        sync_value::SyncValue,
        value_cell::ValueCell,
    },
    ObjectId, Role, SequenceNumber, SyncPacket,
};

/// Anything that can travel through a sync value channel.
pub trait SyncPayload: Serde + Send + Sync + 'static {}

impl<T: Serde + Send + Sync + 'static> SyncPayload for T {}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// How an object is wired once registered. Chosen once, never switched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Binding {
    Sender { params: ChannelParams },
    Receiver { channel: u16 },
}

impl Binding {
    pub(crate) fn role(&self) -> Role {
        match self {
            Binding::Sender { .. } => Role::Sender,
            Binding::Receiver { .. } => Role::Receiver,
        }
    }

    pub(crate) fn channel(&self) -> u16 {
        match self {
            Binding::Sender { params } => params.channel,
            Binding::Receiver { channel } => *channel,
        }
    }
}

/// Type-erased view of a sync object, used by registries and listeners
pub(crate) trait RegisteredObject: Send + Sync {
    fn id(&self) -> ObjectId;
    fn binding(&self) -> &Binding;
    fn payload_length(&self) -> usize;
    /// Decodes and offers an inbound value; `Ok(true)` if accepted
    fn deliver(&self, sequence: SequenceNumber, payload: &[u8]) -> Result<bool, SerdeErr>;
    /// Sends the current value, if a transmitter is attached
    fn transmit_current(&self);
    fn start(&self, transmitter: Option<Arc<ValueSender>>);
    fn stop(&self);
}

struct SyncObjectInner<T: SyncPayload> {
    id: ObjectId,
    cell: ValueCell<T>,
    binding: OnceLock<Binding>,
    lifecycle: AtomicU8,
    transmitter: RwLock<Option<Arc<ValueSender>>>,
}

/// A typed, versioned value shared between the coordinator and the render
/// nodes. Cloning the handle shares the same underlying value.
pub struct SyncObject<T: SyncPayload> {
    inner: Arc<SyncObjectInner<T>>,
}

impl<T: SyncPayload> Clone for SyncObject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: SyncPayload> SyncObject<T> {
    /// Creates an unregistered object holding `initial`
    pub fn new(id: ObjectId, initial: T) -> Self {
        Self {
            inner: Arc::new(SyncObjectInner {
                id,
                cell: ValueCell::new(id, initial),
                binding: OnceLock::new(),
                lifecycle: AtomicU8::new(IDLE),
                transmitter: RwLock::new(None),
            }),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// `None` until the object is added to a registry
    pub fn role(&self) -> Option<Role> {
        self.inner.binding.get().map(Binding::role)
    }

    pub fn is_started(&self) -> bool {
        self.inner.lifecycle.load(Ordering::Acquire) == RUNNING
    }

    // Writing

    /// Stores a new value to be transmitted (SENDER only).
    ///
    /// # Panics
    /// Panics if the object is not a registered SENDER.
    pub fn set_data(&self, value: T) {
        if let Err(err) = self.try_set_data(value) {
            panic!("{}", err);
        }
    }

    pub fn try_set_data(&self, value: T) -> Result<(), SyncObjectError> {
        self.require_role(Role::Sender, "set_data")?;
        let stored = self.inner.cell.replace_local(value);
        trace!("sync object {} set to sequence {}", stored.id, stored.sequence);
        Ok(())
    }

    /// Pushes the current value to every destination right away (SENDER only).
    ///
    /// # Panics
    /// Panics if the object is not a registered SENDER of a running registry.
    pub fn send(&self) {
        if let Err(err) = self.try_send() {
            panic!("{}", err);
        }
    }

    pub fn try_send(&self) -> Result<(), SyncObjectError> {
        self.require_role(Role::Sender, "send")?;
        self.require_running()?;
        let transmitter = self
            .inner
            .transmitter
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(transmitter) = transmitter.as_ref() else {
            return Err(SyncObjectError::Stopped { id: self.inner.id });
        };
        self.inner.transmit(transmitter);
        Ok(())
    }

    // Reading

    /// Latest accepted (or, for a SENDER, latest stored) value.
    ///
    /// # Panics
    /// Panics if the owning registry never started synching.
    pub fn get_data(&self) -> T {
        match self.try_get_data() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_get_data(&self) -> Result<T, SyncObjectError> {
        Ok(self.try_snapshot()?.payload.clone())
    }

    /// Latest value together with its sequence number and arrival time.
    ///
    /// # Panics
    /// Panics if the owning registry never started synching.
    pub fn snapshot(&self) -> Arc<SyncValue<T>> {
        match self.try_snapshot() {
            Ok(value) => value,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_snapshot(&self) -> Result<Arc<SyncValue<T>>, SyncObjectError> {
        self.require_started_once()?;
        Ok(self.inner.cell.snapshot())
    }

    /// True exactly once for every newly accepted inbound value.
    ///
    /// # Panics
    /// Panics if the owning registry never started synching.
    pub fn has_changed(&self) -> bool {
        match self.try_has_changed() {
            Ok(changed) => changed,
            Err(err) => panic!("{}", err),
        }
    }

    pub fn try_has_changed(&self) -> Result<bool, SyncObjectError> {
        self.require_started_once()?;
        Ok(self.inner.cell.take_changed())
    }

    // Registration

    pub(crate) fn bind(
        &self,
        role: Role,
        params: ChannelParams,
    ) -> Result<Arc<dyn RegisteredObject>, RegistryError> {
        let binding = match role {
            Role::Sender => Binding::Sender { params },
            Role::Receiver => Binding::Receiver {
                channel: params.channel,
            },
        };
        self.inner
            .binding
            .set(binding)
            .map_err(|_| RegistryError::AlreadyRegistered { id: self.inner.id })?;
        let object: Arc<dyn RegisteredObject> = self.inner.clone();
        Ok(object)
    }

    fn require_role(&self, role: Role, operation: &'static str) -> Result<(), SyncObjectError> {
        let id = self.inner.id;
        match self.inner.binding.get() {
            None => Err(SyncObjectError::NotRegistered { id }),
            Some(binding) if binding.role() != role => Err(SyncObjectError::WrongRole {
                id,
                role: binding.role(),
                operation,
            }),
            Some(_) => Ok(()),
        }
    }

    fn require_running(&self) -> Result<(), SyncObjectError> {
        let id = self.inner.id;
        match self.inner.lifecycle.load(Ordering::Acquire) {
            IDLE => Err(SyncObjectError::NotStarted { id }),
            STOPPED => Err(SyncObjectError::Stopped { id }),
            _ => Ok(()),
        }
    }

    fn require_started_once(&self) -> Result<(), SyncObjectError> {
        if self.inner.binding.get().is_none() {
            return Err(SyncObjectError::NotRegistered { id: self.inner.id });
        }
        if self.inner.lifecycle.load(Ordering::Acquire) == IDLE {
            return Err(SyncObjectError::NotStarted { id: self.inner.id });
        }
        Ok(())
    }
}

impl<T: SyncPayload> SyncObjectInner<T> {
    fn transmit(&self, transmitter: &ValueSender) {
        let current = self.cell.snapshot();
        let mut writer = ByteWriter::with_capacity(current.payload.byte_length());
        current.payload.ser(&mut writer);

        match SyncPacket::write(self.id, current.sequence, writer.as_slice()) {
            Ok(datagram) => transmitter.transmit(&datagram),
            Err(err) => error!("sync object {} not sent: {}", self.id, err),
        }
    }
}

impl<T: SyncPayload> RegisteredObject for SyncObjectInner<T> {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn binding(&self) -> &Binding {
        // only reachable through `bind`, which sets the binding first
        match self.binding.get() {
            Some(binding) => binding,
            None => unreachable!("registered sync object without binding"),
        }
    }

    fn payload_length(&self) -> usize {
        self.cell.snapshot().payload.byte_length()
    }

    fn deliver(&self, sequence: SequenceNumber, payload: &[u8]) -> Result<bool, SerdeErr> {
        let mut reader = ByteReader::new(payload);
        let value = T::de(&mut reader)?;
        if !reader.is_empty() {
            return Err(SerdeErr::TrailingBytes {
                remaining: reader.remaining(),
            });
        }
        Ok(self.cell.accept_remote(sequence, value))
    }

    fn transmit_current(&self) {
        let transmitter = self
            .transmitter
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(transmitter) = transmitter.as_ref() {
            self.transmit(transmitter);
        }
    }

    fn start(&self, transmitter: Option<Arc<ValueSender>>) {
        *self
            .transmitter
            .write()
            .unwrap_or_else(PoisonError::into_inner) = transmitter;
        self.lifecycle.store(RUNNING, Ordering::Release);
    }

    fn stop(&self) {
        self.lifecycle.store(STOPPED, Ordering::Release);
        // waits for any in-flight send, then releases the socket
        self.transmitter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}
