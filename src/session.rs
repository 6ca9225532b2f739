//! Client Session: per-connection state, binding transport writes to
//! the Control Point encoder and incoming records to the NS/DS parsers.
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};

use crate::attributes::{Action, AppAttributeId, AppAttributeTable, NotifAttributeId, NotifAttributeTable};
use crate::config::DEFAULT_CP_BUFFER_LEN;
use crate::control_point::{encode_get_app_attrs, encode_get_notif_attrs, encode_perform_notif_action};
use crate::cursor::WriteCursor;
use crate::data_source::{Command, DataSourceParser};
use crate::error::Error;
use crate::event::EventSink;
use crate::notification_source::{decode_ns_record, NotifSummary};
use crate::transport::{DiscoveredCharacteristic, Transport};
use crate::uuid::{ANCS_SERVICE_UUID, CONTROL_POINT_UUID, DATA_SOURCE_UUID, NOTIFICATION_SOURCE_UUID};

struct Handles<H> {
    cp: Option<H>,
    ns: Option<H>,
    ns_cccd: Option<H>,
    ds: Option<H>,
    ds_cccd: Option<H>,
}

impl<H> Handles<H> {
    const fn empty() -> Self {
        Self {
            cp: None,
            ns: None,
            ns_cccd: None,
            ds: None,
            ds_cccd: None,
        }
    }
}

struct Subscriptions {
    ns_enabled: bool,
    ds_enabled: bool,
}

/// Owns one ANCS connection's worth of state: resolved characteristic
/// handles, the two attribute-subscription tables, the Data Source parser,
/// the single-permit Control Point mutex, and the event sink.
///
/// `W` is the width in bytes of the Control Point staging buffer (at least
/// 18 recommended; must fit the largest encoded command).
pub struct ClientSession<'d, T: Transport, S: EventSink, M: RawMutex, const W: usize = DEFAULT_CP_BUFFER_LEN> {
    transport: &'d T,
    sink: BlockingMutex<M, RefCell<S>>,
    handles: BlockingMutex<M, RefCell<Handles<T::Handle>>>,
    subs: BlockingMutex<M, RefCell<Subscriptions>>,
    notif_table: BlockingMutex<M, RefCell<NotifAttributeTable<'d>>>,
    app_table: BlockingMutex<M, RefCell<AppAttributeTable<'d>>>,
    parser: BlockingMutex<M, RefCell<DataSourceParser>>,
    cp_permit: Mutex<M, ()>,
    ds_done: Signal<M, ()>,
    disconnected: BlockingMutex<M, RefCell<bool>>,
}

impl<'d, T: Transport, S: EventSink, M: RawMutex, const W: usize> ClientSession<'d, T, S, M, W> {
    /// An idle session bound to `transport`, delivering decoded events to `sink`.
    pub const fn new(transport: &'d T, sink: S) -> Self {
        Self {
            transport,
            sink: BlockingMutex::new(RefCell::new(sink)),
            handles: BlockingMutex::new(RefCell::new(Handles::empty())),
            subs: BlockingMutex::new(RefCell::new(Subscriptions {
                ns_enabled: false,
                ds_enabled: false,
            })),
            notif_table: BlockingMutex::new(RefCell::new(NotifAttributeTable::new())),
            app_table: BlockingMutex::new(RefCell::new(AppAttributeTable::new())),
            parser: BlockingMutex::new(RefCell::new(DataSourceParser::new())),
            cp_permit: Mutex::new(()),
            ds_done: Signal::new(),
            disconnected: BlockingMutex::new(RefCell::new(false)),
        }
    }

    /// Mark `id` requested for `GetNotifAttrs`, backed by `buf`.
    pub fn attr_add_notif(&self, id: NotifAttributeId, buf: &'d mut [u8]) -> Result<(), Error<T::Error>> {
        self.notif_table.lock(|t| t.borrow_mut().add(id, buf))
    }

    /// Mark `id` requested for `GetAppAttrs`, backed by `buf`.
    pub fn attr_add_app(&self, id: AppAttributeId, buf: &'d mut [u8]) -> Result<(), Error<T::Error>> {
        self.app_table.lock(|t| t.borrow_mut().add(id, buf))
    }

    /// Resolve the Control Point, Notification Source and Data Source
    /// handles (and the latter two's CCCDs) out of a discovery result
    /// produced by the collaborating transport.
    pub fn handles_assign(
        &self,
        service_uuid: crate::uuid::Uuid,
        characteristics: &[DiscoveredCharacteristic<T::Handle>],
    ) -> Result<(), Error<T::Error>> {
        if service_uuid != ANCS_SERVICE_UUID {
            return Err(Error::NotSupported);
        }
        let cp = characteristics
            .iter()
            .find(|c| c.uuid == CONTROL_POINT_UUID)
            .ok_or(Error::Invalid)?;
        let ns = characteristics
            .iter()
            .find(|c| c.uuid == NOTIFICATION_SOURCE_UUID)
            .ok_or(Error::Invalid)?;
        let ds = characteristics
            .iter()
            .find(|c| c.uuid == DATA_SOURCE_UUID)
            .ok_or(Error::Invalid)?;
        let ns_cccd = ns.cccd_handle.ok_or(Error::Invalid)?;
        let ds_cccd = ds.cccd_handle.ok_or(Error::Invalid)?;

        self.handles.lock(|h| {
            let mut h = h.borrow_mut();
            h.cp = Some(cp.value_handle);
            h.ns = Some(ns.value_handle);
            h.ns_cccd = Some(ns_cccd);
            h.ds = Some(ds.value_handle);
            h.ds_cccd = Some(ds_cccd);
        });
        self.disconnected.lock(|d| *d.borrow_mut() = false);
        Ok(())
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.lock(|d| *d.borrow())
    }

    /// Enable notifications on the Notification Source characteristic.
    pub async fn ns_enable(&self) -> Result<(), Error<T::Error>> {
        let handle = self.handles.lock(|h| h.borrow().ns_cccd).ok_or(Error::NotSupported)?;
        if self.subs.lock(|s| s.borrow().ns_enabled) {
            return Err(Error::AlreadyDone);
        }
        self.transport.subscribe(handle).await.map_err(Error::Transport)?;
        self.subs.lock(|s| s.borrow_mut().ns_enabled = true);
        Ok(())
    }

    /// Disable notifications on the Notification Source characteristic.
    pub async fn ns_disable(&self) -> Result<(), Error<T::Error>> {
        let handle = self.handles.lock(|h| h.borrow().ns_cccd).ok_or(Error::NotSupported)?;
        if !self.subs.lock(|s| s.borrow().ns_enabled) {
            return Err(Error::NotEnabled);
        }
        self.transport.unsubscribe(handle).await.map_err(Error::Transport)?;
        self.subs.lock(|s| s.borrow_mut().ns_enabled = false);
        Ok(())
    }

    /// Enable notifications on the Data Source characteristic.
    pub async fn ds_enable(&self) -> Result<(), Error<T::Error>> {
        let handle = self.handles.lock(|h| h.borrow().ds_cccd).ok_or(Error::NotSupported)?;
        if self.subs.lock(|s| s.borrow().ds_enabled) {
            return Err(Error::AlreadyDone);
        }
        self.transport.subscribe(handle).await.map_err(Error::Transport)?;
        self.subs.lock(|s| s.borrow_mut().ds_enabled = true);
        Ok(())
    }

    /// Disable notifications on the Data Source characteristic.
    pub async fn ds_disable(&self) -> Result<(), Error<T::Error>> {
        let handle = self.handles.lock(|h| h.borrow().ds_cccd).ok_or(Error::NotSupported)?;
        if !self.subs.lock(|s| s.borrow().ds_enabled) {
            return Err(Error::NotEnabled);
        }
        self.transport.unsubscribe(handle).await.map_err(Error::Transport)?;
        self.subs.lock(|s| s.borrow_mut().ds_enabled = false);
        Ok(())
    }

    /// Request notification attributes for `summary.notif_uid`.
    ///
    /// Suspends on the single-permit Control Point mutex for at most
    /// `timeout`; on success, stays suspended until the matching Data
    /// Source response has been fully parsed, since the session owns a
    /// single parser instance and a second in-flight response would
    /// corrupt it.
    pub async fn request_attrs(&self, summary: NotifSummary, timeout: Duration) -> Result<(), Error<T::Error>> {
        if self.is_disconnected() {
            return Err(Error::Disconnected);
        }
        let cp_handle = self.handles.lock(|h| h.borrow().cp).ok_or(Error::NotSupported)?;
        let _permit = with_timeout(timeout, self.cp_permit.lock()).await.map_err(|_| Error::Busy)?;

        let expected = self.notif_table.lock(|t| t.borrow().requested_count());
        self.parser.lock(|p| p.borrow_mut().prime(Command::GetNotifAttrs, expected));
        self.ds_done.reset();

        let mut staging = [0u8; W];
        let mut w = WriteCursor::new(&mut staging);
        self.notif_table
            .lock(|t| encode_get_notif_attrs(&mut w, summary.notif_uid, &t.borrow()))?;

        if let Err(e) = self.transport.write_with_response(cp_handle, w.as_slice()).await {
            self.report_provider_status(&e);
            return Err(Error::Transport(e));
        }

        self.await_ds_done(timeout).await
    }

    /// Request app attributes for `app_id` (`app_id[..len]` is the
    /// identifier; `app_id[len]` must be the NUL terminator).
    pub async fn app_attr_request(
        &self,
        app_id: &[u8],
        len: usize,
        timeout: Duration,
    ) -> Result<(), Error<T::Error>> {
        if self.is_disconnected() {
            return Err(Error::Disconnected);
        }
        if len == 0 || app_id.get(len) != Some(&0) {
            return Err(Error::Invalid);
        }
        let cp_handle = self.handles.lock(|h| h.borrow().cp).ok_or(Error::NotSupported)?;
        let _permit = with_timeout(timeout, self.cp_permit.lock()).await.map_err(|_| Error::Busy)?;

        let expected = self.app_table.lock(|t| t.borrow().requested_count());
        self.parser.lock(|p| p.borrow_mut().prime(Command::GetAppAttrs, expected));
        self.ds_done.reset();

        let mut staging = [0u8; W];
        let mut w = WriteCursor::new(&mut staging);
        self.app_table
            .lock(|t| encode_get_app_attrs(&mut w, &app_id[..=len], &t.borrow()))?;

        if let Err(e) = self.transport.write_with_response(cp_handle, w.as_slice()).await {
            self.report_provider_status(&e);
            return Err(Error::Transport(e));
        }

        self.await_ds_done(timeout).await
    }

    /// Invoke a positive/negative action on the notification identified by `uid`.
    ///
    /// No Data Source response follows this command; the mutex is released
    /// as soon as the write completes.
    pub async fn perform_action(&self, uid: u32, action: Action, timeout: Duration) -> Result<(), Error<T::Error>> {
        if self.is_disconnected() {
            return Err(Error::Disconnected);
        }
        let cp_handle = self.handles.lock(|h| h.borrow().cp).ok_or(Error::NotSupported)?;
        let _permit = with_timeout(timeout, self.cp_permit.lock()).await.map_err(|_| Error::Busy)?;

        let mut staging = [0u8; W];
        let mut w = WriteCursor::new(&mut staging);
        encode_perform_notif_action(&mut w, uid, action)?;

        match self.transport.write_with_response(cp_handle, w.as_slice()).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.report_provider_status(&e);
                Err(Error::Transport(e))
            }
        }
    }

    async fn await_ds_done(&self, timeout: Duration) -> Result<(), Error<T::Error>> {
        match with_timeout(timeout, self.ds_done.wait()).await {
            Ok(()) if self.is_disconnected() => Err(Error::Disconnected),
            Ok(()) => Ok(()),
            Err(_) => Err(Error::Busy),
        }
    }

    fn report_provider_status(&self, error: &T::Error) {
        if let Some(code) = T::provider_status(error) {
            let code = crate::event::ProviderErrorCode::from(code);
            self.sink.lock(|s| s.borrow_mut().on_event(crate::event::Event::NpError { code }));
        }
    }

    /// Route one inbound Notification Source record.
    pub fn on_notification_source(&self, record: &[u8]) {
        self.sink.lock(|s| {
            let mut s = s.borrow_mut();
            decode_ns_record(record, &mut |e| s.on_event(e));
        });
    }

    /// Route one inbound Data Source record, in the order it arrived.
    pub fn on_data_source(&self, payload: &[u8]) {
        self.notif_table.lock(|nt| {
            let mut nt = nt.borrow_mut();
            self.app_table.lock(|at| {
                let mut at = at.borrow_mut();
                self.parser.lock(|p| {
                    let mut p = p.borrow_mut();
                    self.sink.lock(|s| {
                        let mut s = s.borrow_mut();
                        p.feed(payload, &mut nt, &mut at, &mut |e| s.on_event(e));
                    });
                    if p.is_done() {
                        self.ds_done.signal(());
                    }
                });
            });
        });
    }

    /// Reset subscription state and force-release any in-flight Control
    /// Point transaction ("Cancellation").
    pub fn on_disconnected(&self) {
        self.subs.lock(|s| {
            let mut s = s.borrow_mut();
            s.ns_enabled = false;
            s.ds_enabled = false;
        });
        self.disconnected.lock(|d| *d.borrow_mut() = true);
        self.ds_done.signal(());
    }
}
