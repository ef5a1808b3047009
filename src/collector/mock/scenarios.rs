//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states
//! for testing various system conditions.

use super::filesystem::MockFs;
use crate::collector::traits::FsStats;

/// `ut_type` of a login session record.
pub const USER_PROCESS: i16 = 7;
/// `ut_type` of a boot time record.
pub const BOOT_TIME: i16 = 2;

#[allow(dead_code)]
impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1), bash shell, and a `cat` child of the shell.
    pub fn typical_system() -> Self {
        let fs = Self::new();

        // System-wide files
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
Dirty:              1024 kB
Slab:             512000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        // Two physical cores with two hardware threads each
        let mut cpuinfo = String::new();
        for (processor, core) in [(0, 0), (1, 1), (2, 0), (3, 1)] {
            cpuinfo.push_str(&format!(
                "processor\t: {}\nvendor_id\t: GenuineIntel\nmodel name\t: Intel(R) Core(TM) i5-8250U CPU @ 1.60GHz\nphysical id\t: 0\nsiblings\t: 4\ncore id\t\t: {}\ncpu cores\t: 2\n\n",
                processor, core
            ));
        }
        fs.add_file("/proc/cpuinfo", cpuinfo);

        fs.add_file(
            "/proc/vmstat",
            "\
pgpgin 123456
pgpgout 654321
pswpin 100
pswpout 200
pgfault 999999
pgmajfault 1234
oom_kill 0
",
        );

        // Mounts, including virtual filesystems and an escaped mount point
        fs.add_file(
            "/proc/mounts",
            "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
devtmpfs /dev devtmpfs rw,nosuid,size=8192000k,mode=755 0 0
devpts /dev/pts devpts rw,nosuid,noexec,relatime,gid=5,mode=620 0 0
tmpfs /run tmpfs rw,nosuid,nodev,mode=755 0 0
/dev/sdb1 /media/usb\\040drive vfat rw,nosuid,nodev,relatime 0 0
",
        );
        fs.set_fs_stats(
            "/",
            FsStats {
                fragment_size: 4096,
                blocks: 25_000_000,
                blocks_free: 11_000_000,
                blocks_available: 10_000_000,
            },
        );

        // Disk statistics
        fs.add_file(
            "/proc/diskstats",
            "\
   7       0 loop0 150 0 2400 30 0 0 0 0 0 40 30 0 0 0 0
   1       0 ram0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
 259       1 nvme0n1p1 40000 150 1600000 9000 25000 120 1200000 7000 0 12000 16000 0 0 0 0
",
        );

        // Network device statistics
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 12345678     9876    0    0    0     0          0         0 12345678     9876    0    0    0     0       0          0
  eth0: 987654321   654321    5   10    0     0          0       100 123456789   456789    2    5    0     0       0          0
",
        );

        // Socket tables: a listener on 127.0.0.1:8080 and an outgoing HTTPS
        // connection; ssh listening on ::1; a DHCP client socket.
        fs.add_file(
            "/proc/net/tcp",
            "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000  1000        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:C350 2E10A8C0:01BB 01 00000000:00000000 02:000A7F2C 00000000  1000        0 12346 2 0000000000000000 20 4 30 10 -1
",
        );
        fs.add_file(
            "/proc/net/tcp6",
            "\
  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000000000000000000001000000:0016 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 23456 1 0000000000000000 100 0 0 10 0
",
        );
        fs.add_file(
            "/proc/net/udp",
            "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops
  100: 00000000:0044 00000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 34567 2 0000000000000000 0
",
        );

        // Session accounting: one boot record and one login
        let mut utmp = Self::utmp_record(BOOT_TIME, 0, "~", "reboot", "6.1.0", 1_700_000_000, 0);
        utmp.extend(Self::utmp_record(
            USER_PROCESS,
            999,
            "pts/0",
            "user",
            "192.168.16.1",
            1_700_000_500,
            250_000,
        ));
        fs.add_file("/var/run/utmp", utmp);

        // PID 1 - init/systemd; its fd table and exe link are root-only
        fs.add_process(
            1,
            "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 2000 1000 20 0 1 0 1 170000000 3000 18446744073709551615 0 0 0 0 0 0 0 0 1073745152 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tsystemd
State:\tS (sleeping)
Pid:\t1
PPid:\t0
Uid:\t0\t0\t0\t0
Gid:\t0\t0\t0\t0
VmPeak:\t  200000 kB
VmSize:\t  170000 kB
VmRSS:\t    12000 kB
Threads:\t1
voluntary_ctxt_switches:\t1000
nonvoluntary_ctxt_switches:\t100
",
            "/sbin/init\0splash\0",
            "systemd\n",
        );
        fs.add_symlink("/proc/1/exe", "/usr/lib/systemd/systemd");
        fs.deny("/proc/1/exe");
        fs.deny("/proc/1/fd");

        // PID 1000 - bash shell
        fs.add_process(
            1000,
            "1000 (bash) S 999 1000 1000 34816 1001 4194304 5000 50000 0 0 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tbash
State:\tS (sleeping)
Pid:\t1000
PPid:\t999
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
Threads:\t1
voluntary_ctxt_switches:\t500
nonvoluntary_ctxt_switches:\t50
",
            "/bin/bash\0--login\0",
            "bash\n",
        );
        fs.add_symlink("/proc/1000/exe", "/usr/bin/bash");
        fs.add_symlink("/proc/1000/fd/0", "/dev/pts/0");
        fs.add_symlink("/proc/1000/fd/1", "/dev/pts/0");
        fs.add_symlink("/proc/1000/fd/255", "/home/user/.bash_history");

        // PID 1001 - cat command (child of bash)
        fs.add_process(
            1001,
            "1001 (cat) R 1000 1000 1000 34816 1001 4194304 100 0 0 0 5 2 0 0 20 0 1 0 100100 5000000 500 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tcat
State:\tR (running)
Pid:\t1001
PPid:\t1000
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmPeak:\t    6000 kB
VmSize:\t    5000 kB
VmRSS:\t    2000 kB
Threads:\t1
voluntary_ctxt_switches:\t10
nonvoluntary_ctxt_switches:\t2
",
            "/bin/cat\0file.txt\0",
            "cat\n",
        );
        fs.add_symlink("/proc/1001/exe", "/usr/bin/cat");
        fs.add_symlink("/proc/1001/fd/0", "/dev/pts/0");
        fs.add_symlink("/proc/1001/fd/3", "/home/user/file.txt");
        fs.add_symlink("/proc/1001/fd/4", "socket:[12346]");
        fs.add_symlink("/proc/1001/fd/5", "/tmp/cat.lock");

        fs
    }

    /// Creates a system with memory pressure (low free memory, swap in use).
    pub fn memory_pressure() -> Self {
        let fs = Self::typical_system();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:          256000 kB
MemAvailable:     512000 kB
Buffers:           64000 kB
Cached:           256000 kB
SwapCached:       128000 kB
SwapTotal:       4096000 kB
SwapFree:        1024000 kB
",
        );

        // Add memory-hungry process
        fs.add_process(
            3000,
            "3000 (memhog) S 1 3000 3000 0 -1 4194304 5000000 0 10000 0 1000 500 0 0 20 0 8 0 300000 14000000000 3500000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tmemhog
State:\tD (disk sleep)
Pid:\t3000
PPid:\t1
VmPeak:\t14000000 kB
VmSize:\t14000000 kB
VmRSS:\t12000000 kB
VmSwap:\t 2000000 kB
Threads:\t8
",
            "/usr/local/bin/memhog\0--size\x0014G\0",
            "memhog\n",
        );

        fs
    }

    /// Creates a system with a zombie process.
    ///
    /// The zombie (PID 4000, child of bash) exited with status 3.
    pub fn with_zombie_process() -> Self {
        let fs = Self::typical_system();

        fs.add_process(
            4000,
            "4000 (defunct) Z 1000 4000 1000 0 -1 4194308 0 0 0 0 0 0 0 0 20 0 1 0 400000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 768",
            "\
Name:\tdefunct
State:\tZ (zombie)
Pid:\t4000
PPid:\t1000
Threads:\t1
",
            "",
            "defunct\n",
        );

        fs
    }

    /// Creates a system with processes that have special characters in names.
    pub fn with_special_names() -> Self {
        let fs = Self::typical_system();

        // Process with spaces in name (like Firefox's "Web Content")
        fs.add_process(
            5000,
            "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tWeb Content
State:\tS (sleeping)
Pid:\t5000
PPid:\t4999
VmSize:\t 2000000 kB
VmRSS:\t  200000 kB
Threads:\t20
",
            "/usr/lib/firefox/firefox\0-contentproc\0",
            "Web Content\n",
        );

        // Process with parentheses in name
        fs.add_process(
            5001,
            "5001 (test(1)) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\ttest(1)
State:\tS (sleeping)
Pid:\t5001
PPid:\t1
VmSize:\t   10000 kB
VmRSS:\t    4000 kB
Threads:\t1
",
            "/usr/bin/test(1)\0",
            "test(1)\n",
        );

        fs
    }

    /// Encodes one glibc `struct utmp` record (384 bytes, x86-64 layout).
    pub fn utmp_record(
        kind: i16,
        pid: i32,
        line: &str,
        user: &str,
        host: &str,
        tv_sec: i32,
        tv_usec: i32,
    ) -> Vec<u8> {
        fn put_str(buf: &mut [u8], offset: usize, len: usize, value: &str) {
            let bytes = value.as_bytes();
            let n = bytes.len().min(len);
            buf[offset..offset + n].copy_from_slice(&bytes[..n]);
        }

        let mut buf = vec![0u8; 384];
        buf[0..2].copy_from_slice(&kind.to_ne_bytes());
        buf[4..8].copy_from_slice(&pid.to_ne_bytes());
        put_str(&mut buf, 8, 32, line);
        put_str(&mut buf, 44, 32, user);
        put_str(&mut buf, 76, 256, host);
        buf[340..344].copy_from_slice(&tv_sec.to_ne_bytes());
        buf[344..348].copy_from_slice(&tv_usec.to_ne_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::Path;

    fn read_to_string(fs: &MockFs, path: &str) -> String {
        String::from_utf8(fs.read(Path::new(path)).unwrap()).unwrap()
    }

    #[test]
    fn test_typical_system_has_required_files() {
        let fs = MockFs::typical_system();

        // System files
        for path in [
            "/proc/meminfo",
            "/proc/stat",
            "/proc/cpuinfo",
            "/proc/uptime",
            "/proc/mounts",
            "/proc/diskstats",
            "/proc/net/dev",
            "/proc/net/tcp",
            "/var/run/utmp",
        ] {
            assert!(fs.exists(Path::new(path)), "{} missing", path);
        }

        // Processes
        assert!(fs.exists(Path::new("/proc/1")));
        assert!(fs.exists(Path::new("/proc/1000")));
        assert!(fs.exists(Path::new("/proc/1001")));
        assert!(fs.statvfs(Path::new("/home/user")).is_ok());
    }

    #[test]
    fn test_memory_pressure_shows_low_free_memory() {
        let fs = MockFs::memory_pressure();
        let meminfo = read_to_string(&fs, "/proc/meminfo");
        assert!(meminfo.contains("MemFree:          256000 kB"));
    }

    #[test]
    fn test_zombie_process() {
        let fs = MockFs::with_zombie_process();
        let stat = read_to_string(&fs, "/proc/4000/stat");
        assert!(stat.contains(") Z ")); // Zombie state
    }

    #[test]
    fn test_special_names() {
        let fs = MockFs::with_special_names();

        let stat = read_to_string(&fs, "/proc/5000/stat");
        assert!(stat.contains("(Web Content)"));

        let stat = read_to_string(&fs, "/proc/5001/stat");
        assert!(stat.contains("(test(1))"));
    }

    #[test]
    fn test_utmp_record_layout() {
        let record = MockFs::utmp_record(USER_PROCESS, 42, "tty1", "root", "", 10, 20);
        assert_eq!(record.len(), 384);
        assert_eq!(i16::from_ne_bytes([record[0], record[1]]), USER_PROCESS);
        assert_eq!(&record[8..12], b"tty1");
        assert_eq!(record[12], 0);
        assert_eq!(&record[44..48], b"root");
    }
}
