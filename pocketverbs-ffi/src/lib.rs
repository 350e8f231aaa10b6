//! C ABI wrapper for the PocketVerbs engine.
//!
//! Two entry styles:
//! - a plugin descriptor (`lv2_descriptor`) with the usual
//!   instantiate / connect_port / activate / run / deactivate / cleanup table;
//! - a direct opaque-handle API (`pocketverbs_*`) for hosts that just want to
//!   push buffers through the reverb.
//!
//! ABI notes
//! - All exported functions are `extern "C"` and `#[no_mangle]`.
//! - Null handles and null buffers are tolerated; functions return sentinels.
//! - Input and output buffers may alias. Samples are read and written one frame
//!   at a time through raw pointers, never through overlapping slices.
//!
//! Threading
//! - An instance is NOT thread-safe; call everything from the audio thread.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

use std::ffi::{c_char, c_void, CStr};
use std::ptr;

use pocketverbs_engine::{ReverbEngine, ReverbParams};

/// Plugin URI reported by the descriptor.
pub const PLUGIN_URI: &CStr = c"urn:pocketverbs:reverb";

/// Port indices of the descriptor interface.
pub mod port {
    pub const IN_L: u32 = 0;
    pub const IN_R: u32 = 1;
    pub const OUT_L: u32 = 2;
    pub const OUT_R: u32 = 3;
    pub const TYPE: u32 = 4;
    pub const SIZE: u32 = 5;
    pub const GATING: u32 = 6;
    pub const DRY_WET: u32 = 7;
}

/// Parameter ids accepted by [`pocketverbs_set_param`].
pub const PARAM_TYPE: u32 = 0;
pub const PARAM_SIZE: u32 = 1;
pub const PARAM_GATING: u32 = 2;
pub const PARAM_DRY_WET: u32 = 3;

pub type Handle = *mut c_void;

/// Host feature entry; passed through untouched.
#[repr(C)]
pub struct Feature {
    pub uri: *const c_char,
    pub data: *mut c_void,
}

/// Function table a host looks up through [`lv2_descriptor`].
#[repr(C)]
pub struct PluginDescriptor {
    pub uri: *const c_char,
    pub instantiate: extern "C" fn(
        descriptor: *const PluginDescriptor,
        sample_rate: f64,
        bundle_path: *const c_char,
        features: *const *const Feature,
    ) -> Handle,
    pub connect_port: extern "C" fn(instance: Handle, port: u32, data: *mut c_void),
    pub activate: extern "C" fn(instance: Handle),
    pub run: extern "C" fn(instance: Handle, sample_count: u32),
    pub deactivate: extern "C" fn(instance: Handle),
    pub cleanup: extern "C" fn(instance: Handle),
    pub extension_data: extern "C" fn(uri: *const c_char) -> *const c_void,
}

// Only holds a pointer to a static string and function pointers.
unsafe impl Sync for PluginDescriptor {}

static DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    uri: PLUGIN_URI.as_ptr(),
    instantiate,
    connect_port,
    activate,
    run,
    deactivate,
    cleanup,
    extension_data,
};

/// Descriptor for `index` 0; null for every other index.
#[no_mangle]
pub extern "C" fn lv2_descriptor(index: u32) -> *const PluginDescriptor {
    if index == 0 {
        &DESCRIPTOR
    } else {
        ptr::null()
    }
}

/// Host-connected buffers. Null until the host connects them.
struct Ports {
    in_l: *const f32,
    in_r: *const f32,
    out_l: *mut f32,
    out_r: *mut f32,
    // type, size, gating, dry/wet
    controls: [*const f32; 4],
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            in_l: ptr::null(),
            in_r: ptr::null(),
            out_l: ptr::null_mut(),
            out_r: ptr::null_mut(),
            controls: [ptr::null(); 4],
        }
    }
}

struct Instance {
    engine: ReverbEngine,
    ports: Ports,
}

impl Instance {
    /// Pull every connected control value into the engine; unconnected ones keep their value.
    fn read_controls(&mut self) {
        let mut params = self.engine.params();
        for (id, &p) in (0u32..).zip(self.ports.controls.iter()) {
            if !p.is_null() {
                // SAFETY: the host guarantees a connected control port points at a readable f32.
                let value = unsafe { ptr::read(p) };
                apply_param(&mut params, id, value);
            }
        }
        self.engine.set_params(params);
    }
}

fn apply_param(params: &mut ReverbParams, id: u32, value: f32) -> bool {
    match id {
        PARAM_TYPE => params.algorithm = value,
        PARAM_SIZE => params.size = value,
        PARAM_GATING => params.gating = value,
        PARAM_DRY_WET => params.mix = value,
        _ => return false,
    }
    true
}

/// Run one block over raw, possibly aliased, buffers.
///
/// # Safety
/// All four pointers must be valid for `frames` samples.
unsafe fn process_raw(
    engine: &mut ReverbEngine,
    in_l: *const f32,
    in_r: *const f32,
    out_l: *mut f32,
    out_r: *mut f32,
    frames: usize,
) {
    engine.prepare_block();
    for i in 0..frames {
        let l = ptr::read(in_l.add(i));
        let r = ptr::read(in_r.add(i));
        let (yl, yr) = engine.process_frame(l, r);
        ptr::write(out_l.add(i), yl);
        ptr::write(out_r.add(i), yr);
    }
}

// --- Descriptor callbacks ---------------------------------------------------------

#[allow(clippy::cast_possible_truncation)]
extern "C" fn instantiate(
    _descriptor: *const PluginDescriptor,
    sample_rate: f64,
    _bundle_path: *const c_char,
    _features: *const *const Feature,
) -> Handle {
    let engine = ReverbEngine::new(sample_rate as f32);
    tracing::debug!(sample_rate, "pocketverbs instance created");
    Box::into_raw(Box::new(Instance { engine, ports: Ports::default() })).cast()
}

extern "C" fn connect_port(instance: Handle, port: u32, data: *mut c_void) {
    if instance.is_null() {
        return;
    }
    let inst = unsafe { &mut *instance.cast::<Instance>() };
    let ports = &mut inst.ports;
    match port {
        port::IN_L => ports.in_l = data.cast_const().cast(),
        port::IN_R => ports.in_r = data.cast_const().cast(),
        port::OUT_L => ports.out_l = data.cast(),
        port::OUT_R => ports.out_r = data.cast(),
        port::TYPE..=port::DRY_WET => {
            ports.controls[(port - port::TYPE) as usize] = data.cast_const().cast();
        }
        _ => {}
    }
}

extern "C" fn activate(instance: Handle) {
    if instance.is_null() {
        return;
    }
    let inst = unsafe { &mut *instance.cast::<Instance>() };
    inst.engine.activate();
}

extern "C" fn run(instance: Handle, sample_count: u32) {
    if instance.is_null() {
        return;
    }
    let inst = unsafe { &mut *instance.cast::<Instance>() };
    let p = &inst.ports;
    if p.in_l.is_null() || p.in_r.is_null() || p.out_l.is_null() || p.out_r.is_null() {
        return;
    }
    let (in_l, in_r, out_l, out_r) = (p.in_l, p.in_r, p.out_l, p.out_r);
    inst.read_controls();
    // SAFETY: the host guarantees connected audio ports hold `sample_count` samples.
    unsafe { process_raw(&mut inst.engine, in_l, in_r, out_l, out_r, sample_count as usize) };
}

extern "C" fn deactivate(_instance: Handle) {}

extern "C" fn cleanup(instance: Handle) {
    if !instance.is_null() {
        unsafe { drop(Box::from_raw(instance.cast::<Instance>())) };
        tracing::debug!("pocketverbs instance released");
    }
}

extern "C" fn extension_data(_uri: *const c_char) -> *const c_void {
    ptr::null()
}

// --- Direct API -------------------------------------------------------------------

/// Opaque engine we hand to C.
pub struct PocketVerbsEngine {
    inner: ReverbEngine,
}

/// Create an activated engine. Free it with `pocketverbs_destroy`.
#[no_mangle]
pub extern "C" fn pocketverbs_create(sample_rate: f32) -> *mut PocketVerbsEngine {
    tracing::debug!(sample_rate, "pocketverbs engine created");
    Box::into_raw(Box::new(PocketVerbsEngine { inner: ReverbEngine::new(sample_rate) }))
}

/// Destroy an engine previously returned by `pocketverbs_create`.
#[no_mangle]
pub extern "C" fn pocketverbs_destroy(engine: *mut PocketVerbsEngine) {
    if !engine.is_null() {
        unsafe { drop(Box::from_raw(engine)) };
    }
}

/// Zero all reverb state and reseed the dither (transport restart).
#[no_mangle]
pub extern "C" fn pocketverbs_activate(engine: *mut PocketVerbsEngine) {
    if engine.is_null() {
        return;
    }
    let e = unsafe { &mut *engine };
    e.inner.activate();
}

/// Set one knob (0 type, 1 size, 2 gating, 3 dry/wet). Takes effect at the next block.
/// Returns 0 on success, -1 on a null engine or unknown id.
#[no_mangle]
pub extern "C" fn pocketverbs_set_param(
    engine: *mut PocketVerbsEngine,
    param: u32,
    value: f32,
) -> i32 {
    if engine.is_null() {
        return -1;
    }
    let e = unsafe { &mut *engine };
    let mut params = e.inner.params();
    if !apply_param(&mut params, param, value) {
        return -1;
    }
    e.inner.set_params(params);
    0
}

/// Process `frames` stereo frames as one block. Buffers may alias.
///
/// Returns the number of frames processed (0 on any null pointer).
#[no_mangle]
pub extern "C" fn pocketverbs_process(
    engine: *mut PocketVerbsEngine,
    in_l: *const f32,
    in_r: *const f32,
    out_l: *mut f32,
    out_r: *mut f32,
    frames: u32,
) -> u32 {
    if engine.is_null() || in_l.is_null() || in_r.is_null() || out_l.is_null() || out_r.is_null() {
        return 0;
    }
    let e = unsafe { &mut *engine };
    // SAFETY: caller guarantees each buffer holds `frames` samples.
    unsafe { process_raw(&mut e.inner, in_l, in_r, out_l, out_r, frames as usize) };
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketverbs_engine::{Algorithm, ResizeState};

    fn desc() -> &'static PluginDescriptor {
        unsafe { &*lv2_descriptor(0) }
    }

    fn engine_of(h: Handle) -> &'static ReverbEngine {
        unsafe { &(*h.cast::<Instance>()).engine }
    }

    #[test]
    fn only_index_zero_has_a_descriptor() {
        assert!(!lv2_descriptor(0).is_null());
        assert!(lv2_descriptor(1).is_null());
        let uri = unsafe { CStr::from_ptr(desc().uri) };
        assert_eq!(uri, PLUGIN_URI);
        assert!((desc().extension_data)(ptr::null()).is_null());
    }

    #[test]
    fn descriptor_lifecycle_in_place() {
        let d = desc();
        let h = (d.instantiate)(d, 48_000.0, ptr::null(), ptr::null());
        assert!(!h.is_null());

        let mut left: Vec<f32> = (0..256).map(|n| (n as f32 * 0.05).sin() * 0.5).collect();
        let mut right = left.clone();
        let original = left.clone();
        let mut kind = Algorithm::Room.selector();
        let mut size = 0.3_f32;
        let mut gating = 0.0_f32;
        let mut mix = 0.0_f32;

        (d.connect_port)(h, port::IN_L, left.as_mut_ptr().cast());
        (d.connect_port)(h, port::IN_R, right.as_mut_ptr().cast());
        (d.connect_port)(h, port::OUT_L, left.as_mut_ptr().cast());
        (d.connect_port)(h, port::OUT_R, right.as_mut_ptr().cast());
        (d.connect_port)(h, port::TYPE, ptr::addr_of_mut!(kind).cast());
        (d.connect_port)(h, port::SIZE, ptr::addr_of_mut!(size).cast());
        (d.connect_port)(h, port::GATING, ptr::addr_of_mut!(gating).cast());
        (d.connect_port)(h, port::DRY_WET, ptr::addr_of_mut!(mix).cast());
        (d.connect_port)(h, 99, ptr::null_mut());

        (d.activate)(h);
        (d.run)(h, 256);

        let e = engine_of(h);
        assert_eq!(e.params().selected(), Algorithm::Room);
        assert_eq!(e.resize_state(), ResizeState::Resizing(25));
        // fully dry: in-place output is the input plus dither
        for (x, y) in original.iter().zip(&left) {
            assert!((x - y).abs() <= 2.5e-7 * x.abs() + 1e-7);
        }

        (d.deactivate)(h);
        (d.cleanup)(h);
    }

    #[test]
    fn run_without_audio_ports_does_nothing() {
        let d = desc();
        let h = (d.instantiate)(d, 44_100.0, ptr::null(), ptr::null());
        let mut input = vec![0.25_f32; 32];
        (d.connect_port)(h, port::IN_L, input.as_mut_ptr().cast());
        (d.run)(h, 32);
        assert_eq!(engine_of(h).resize_state(), ResizeState::Idle);
        (d.cleanup)(h);
    }

    #[test]
    fn unconnected_controls_keep_previous_values() {
        let d = desc();
        let h = (d.instantiate)(d, 44_100.0, ptr::null(), ptr::null());
        let (mut l, mut r) = (vec![0.0_f32; 16], vec![0.0_f32; 16]);
        let mut size = 0.9_f32;
        (d.connect_port)(h, port::IN_L, l.as_mut_ptr().cast());
        (d.connect_port)(h, port::IN_R, r.as_mut_ptr().cast());
        (d.connect_port)(h, port::OUT_L, l.as_mut_ptr().cast());
        (d.connect_port)(h, port::OUT_R, r.as_mut_ptr().cast());
        (d.connect_port)(h, port::SIZE, ptr::addr_of_mut!(size).cast());
        (d.run)(h, 16);
        let p = engine_of(h).params();
        assert_eq!(p.size, 0.9);
        assert_eq!(p.mix, ReverbParams::default().mix);

        (d.connect_port)(h, port::SIZE, ptr::null_mut());
        (d.run)(h, 16);
        assert_eq!(engine_of(h).params().size, 0.9);
        (d.cleanup)(h);
    }

    #[test]
    fn direct_api_round_trip() {
        let e = pocketverbs_create(44_100.0);
        assert!(!e.is_null());
        assert_eq!(pocketverbs_set_param(e, PARAM_TYPE, 5.0), 0);
        assert_eq!(pocketverbs_set_param(e, PARAM_DRY_WET, 0.7), 0);
        assert_eq!(pocketverbs_set_param(e, 4, 1.0), -1);
        pocketverbs_activate(e);

        let input = vec![0.1_f32; 128];
        let (mut out_l, mut out_r) = (vec![0.0_f32; 128], vec![0.0_f32; 128]);
        let n = pocketverbs_process(
            e,
            input.as_ptr(),
            input.as_ptr(),
            out_l.as_mut_ptr(),
            out_r.as_mut_ptr(),
            128,
        );
        assert_eq!(n, 128);
        assert!(out_l.iter().chain(&out_r).all(|y| y.is_finite()));
        assert_eq!(unsafe { &*e }.inner.params().selected(), Algorithm::Zarathustra);
        pocketverbs_destroy(e);
    }

    #[test]
    fn null_handles_are_tolerated() {
        let null = ptr::null_mut();
        assert_eq!(pocketverbs_set_param(null, PARAM_SIZE, 0.5), -1);
        assert_eq!(
            pocketverbs_process(null, ptr::null(), ptr::null(), ptr::null_mut(), ptr::null_mut(), 64),
            0
        );
        pocketverbs_activate(null);
        pocketverbs_destroy(null);

        let d = desc();
        (d.connect_port)(ptr::null_mut(), port::IN_L, ptr::null_mut());
        (d.activate)(ptr::null_mut());
        (d.run)(ptr::null_mut(), 64);
        (d.cleanup)(ptr::null_mut());
    }
}
