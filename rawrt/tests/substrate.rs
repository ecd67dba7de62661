//! End-to-end use of the substrate the way a frame loop drives it.

use core::alloc::Layout;

use rawrt::math::{self, COS_TOLERANCE};
use rawrt::mm::{self, MapFlags, Prot, Region, MAP_FAILED};
use rawrt::orient::{Quat, Vec3};
use rawrt::time::{ClockId, FrameClock};
use rawrt::{snprintf, Arena};

const MAX_STR: usize = 256;

struct Resources {
    paths: [[u8; MAX_STR]; 3],
}

#[test]
fn test_resource_paths_in_arena() {
    let mut arena = Arena::reserve(256 << 30).expect("256 GiB no-reserve arena");
    let res = arena
        .alloc_value(Resources {
            paths: [[0; MAX_STR]; 3],
        })
        .expect("room for resources");

    let base = "/opt/demo/bin/";
    let names = ["shaders/vert.glsl", "shaders/frag.glsl", "textures/diffuse.bmp"];
    for (path, name) in res.paths.iter_mut().zip(names) {
        let n = snprintf!(&mut path[..], "{}{}", base, name);
        assert_eq!(n, base.len() + name.len());
        assert_eq!(&path[..n], format!("{}{}", base, name).as_bytes());
        assert_eq!(path[n], 0);
    }

    // An over-long path is cut and still terminated.
    let long = "x".repeat(400);
    let n = snprintf!(&mut res.paths[0][..], "{}{}", base, long);
    assert_eq!(n, base.len() + 400);
    assert_eq!(res.paths[0][MAX_STR - 1], 0);
    assert!(res.paths[0][..MAX_STR - 1].iter().all(|&b| b != 0));

    let scratch = arena
        .alloc_zeroed(Layout::from_size_align(1 << 20, 4096).unwrap())
        .unwrap();
    assert_eq!(scratch.as_ptr() as usize % 4096, 0);
    arena.into_region().release().unwrap();
}

#[test]
fn test_raw_mmap_sentinel_and_release() {
    // SAFETY: no FIXED flag, so only a fresh mapping can be created.
    let addr = unsafe {
        mm::mmap(
            0,
            mm::PAGE_SIZE,
            Prot::READ | Prot::WRITE,
            MapFlags::PRIVATE | MapFlags::ANONYMOUS,
            -1,
            0,
        )
    };
    assert_ne!(addr, MAP_FAILED);
    // SAFETY: the page was just mapped read/write.
    unsafe {
        rawrt::mem::memset(addr as *mut u8, 0xAB, mm::PAGE_SIZE);
        assert_eq!(*(addr as *const u8).add(mm::PAGE_SIZE - 1), 0xAB);
    }
    // SAFETY: nothing references the page any more.
    assert_eq!(unsafe { mm::munmap(addr, mm::PAGE_SIZE) }, 0);

    // Zero length is rejected by the kernel.
    // SAFETY: as above.
    let bad = unsafe {
        mm::mmap(0, 0, Prot::READ, MapFlags::PRIVATE | MapFlags::ANONYMOUS, -1, 0)
    };
    assert_eq!(bad, MAP_FAILED);
    assert!(Region::reserve_arena(0).is_err());
}

#[test]
fn test_camera_update_frame() {
    let mut clock = FrameClock::new(ClockId::Monotonic).expect("monotonic clock");
    std::thread::sleep(std::time::Duration::from_millis(20));
    let dt = clock.tick().unwrap();
    assert!(dt >= 1.0, "20 ms is at least one 60 Hz frame, got {}", dt);

    let (mx, my) = (12.0f32, -8.0f32);
    let mut cam_rot = Quat::IDENTITY;
    cam_rot = cam_rot * Quat::from_axis_deg(Vec3::new(1.0, 0.0, 0.0), my);
    cam_rot = Quat::from_axis_deg(Vec3::new(0.0, 1.0, 0.0), mx) * cam_rot;

    let step = cam_rot.rotate(Vec3::new(0.0, 0.0, 0.05));
    let len2 = step.dot(step);
    assert!((len2 - 0.0025).abs() < 0.0001, "{}", len2);

    let mut cam_pos = Vec3::ZERO;
    cam_pos = cam_pos + step;
    cam_pos = cam_pos - step;
    assert_eq!(cam_pos, Vec3::ZERO);
}

#[test]
fn test_trig_against_std() {
    let mut x = -6.0f32;
    while x <= 6.0 {
        assert!((math::cos(x) - x.cos()).abs() <= COS_TOLERANCE, "cos({})", x);
        assert!((math::sin(x) - x.sin()).abs() <= COS_TOLERANCE, "sin({})", x);
        x += 0.01;
    }
    assert_eq!(math::floor(-2.5), -3.0);
}

#[test]
fn test_printf_reports_length() {
    let n = rawrt::printf!("substrate: {} + {} = {}\n", 2, 2, 4);
    assert_eq!(n, "substrate: 2 + 2 = 4\n".len());
}
