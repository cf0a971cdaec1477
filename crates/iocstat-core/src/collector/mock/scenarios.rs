//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical NFS client host.
    ///
    /// Includes network counters, two NFS mounts (one `nfs4`, one `nfs`),
    /// memory and CPU counters, twelve open descriptors, and two
    /// interfaces besides loopback.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/net/netstat",
            "\
TcpExt: SyncookiesSent TcpTimeouts TcpInErrs SyncookiesRecv EmbryonicRsts TcpInSegs TcpOutSegs TcpRetransSegs ListenOverflows ListenDrops TCPTimeouts TCPFastRetrans
TcpExt: 0 7 3 0 12 500000 450000 1000 25 30 150 500
IpExt: InNoRoutes InTruncatedPkts IpInReceives IpOutTransmits IpInUnknownProtos IpReasmTimeout InOctets OutOctets InCsumErrors
IpExt: 0 0 1000000 800000 4 3 10000000000 5000000000 0
",
        );

        fs.add_file("/proc/net/rpc/nfs", "\
net 0 0 0 0
rpc 8742193 12 8742230
proc3 22 0 1021 0 553 112 0 7 0 0 0 0 0 0 0 0 0 0 0 12 3 0 0
proc4 61 0 4410 3 0 2 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0 0
");
        fs.add_file(
            "/proc/net/nfsfs/servers",
            "\
NV SERVER   PORT USE HOSTNAME
v4 0a010200 2049   3 fileserver
v3 0a010203 2049   1 10.1.2.3
",
        );
        fs.add_file(
            "/proc/mounts",
            "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
fileserver:/home /home nfs4 rw,relatime,vers=4.2,rsize=1048576,wsize=1048576,hard,proto=tcp 0 0
nfsd /proc/fs/nfsd nfsd rw,relatime 0 0
10.1.2.3:/scratch /mnt/scratch nfs rw,relatime,vers=3,hard,proto=tcp,mountproto=udp 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
",
        );

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
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
        fs.add_file(
            "/proc/self/stat",
            "4242 (iocstatd) S 1 4242 4242 0 -1 4194304 100 0 0 0 200 50 0 0 20 0 4 0 500 100000000 2000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0",
        );
        fs.add_file(
            "/proc/self/limits",
            "\
Limit                     Soft Limit           Hard Limit           Units
Max cpu time              unlimited            unlimited            seconds
Max file size             unlimited            unlimited            bytes
Max processes             63457                63457                processes
Max open files            1024                 524288               files
",
        );
        fs.add_fds("/proc", 12);

        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234567     1234    9    0    0     0          0         0  1234567     1234    9    0    0     0       0          0
  eth0: 9876543     5678    1    2    0     0          0        10 87654321     4321    3    4    0     0       0          0
  eth1:  555555      555    5    0    0     0          0         0   444444      444    2    0    0     0       0          0
",
        );

        fs
    }

    /// Creates a host without NFS client support or network counters.
    ///
    /// Memory, CPU and descriptor files are present.
    pub fn minimal_system() -> Self {
        let mut fs = Self::typical_system();
        fs.remove_file("/proc/net/netstat");
        fs.remove_file("/proc/net/rpc/nfs");
        fs.remove_file("/proc/net/nfsfs/servers");
        fs.add_file(
            "/proc/mounts",
            "/dev/sda1 / ext4 rw,relatime 0 0\ntmpfs /run tmpfs rw 0 0\n",
        );
        fs
    }
}
